//! The agenda root: owns the config and the request-scoped lookups, and
//! exposes the render and sync entry points.

use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};

use crate::config::AgendaConfig;
use crate::constants::{DELETE_BATCH_PAUSE, DELETE_BATCH_SIZE};
use crate::error::AgendaResult;
use crate::error_log::{ErrorKind, ErrorLog, ErrorRecord};
use crate::event::Event;
use crate::filter::FilterSpec;
use crate::grid::{DepartmentGlyphs, GridBuilder, MonthGrid};
use crate::normalize::{Normalized, normalize_sources};
use crate::remote::CalendarStore;
use crate::source::{departments, read_sources};
use crate::special_days::SpecialDays;
use crate::sync::{
    ExternalEventOptions, PurgeOutcome, ReconcileOutcome, ReconcilePlan, TrackingStore, plan,
    purge, reconcile,
};

/// Everything needed to draw one render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub filter: FilterSpec,
    pub grids: Vec<MonthGrid>,
    pub glyphs: DepartmentGlyphs,
    /// Events that passed the filter.
    pub matched: usize,
    /// Events read from all sources.
    pub total: usize,
}

pub struct Agenda {
    config: AgendaConfig,
    // Memoized for one render or sync; cleared at every entry point.
    departments: OnceLock<Vec<String>>,
    special_days: OnceLock<SpecialDays>,
}

impl Agenda {
    pub fn load() -> AgendaResult<Self> {
        Ok(Self::from_config(AgendaConfig::load()?))
    }

    pub fn from_config(config: AgendaConfig) -> Self {
        Agenda {
            config,
            departments: OnceLock::new(),
            special_days: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &AgendaConfig {
        &self.config
    }

    pub fn error_log(&self) -> ErrorLog {
        ErrorLog::new(self.config.error_log_path())
    }

    pub fn tracking(&self) -> TrackingStore {
        TrackingStore::new(self.config.tracking_path())
    }

    fn begin(&mut self) {
        self.departments.take();
        self.special_days.take();
    }

    /// Read and normalize every source. The DATA section of the error log
    /// is replaced with this refresh's problems.
    pub fn refresh(&self) -> AgendaResult<Normalized> {
        let sources = read_sources(&self.config.sources_path())?;
        let normalized = normalize_sources(&sources);

        tracing::info!(
            "Read {} events from {} departments",
            normalized.events.len(),
            normalized.departments.len()
        );

        self.replace_errors(ErrorKind::Data, &normalized.errors);
        self.departments
            .get_or_init(|| normalized.departments.clone());

        Ok(normalized)
    }

    /// Departments of the qualifying sources, in read order.
    pub fn departments(&mut self) -> AgendaResult<Vec<String>> {
        self.begin();
        self.cached_departments().map(<[String]>::to_vec)
    }

    fn cached_departments(&self) -> AgendaResult<&[String]> {
        if let Some(departments) = self.departments.get() {
            return Ok(departments);
        }
        let sources = read_sources(&self.config.sources_path())?;
        Ok(self.departments.get_or_init(|| departments(&sources.tables)))
    }

    /// Overlays for this request. An unreadable file degrades to none.
    fn special_days(&self) -> &SpecialDays {
        self.special_days.get_or_init(|| {
            let path = self.config.special_days_path();
            match SpecialDays::load(&path) {
                Ok((days, errors)) => {
                    self.replace_errors(ErrorKind::Parse, &errors);
                    days
                }
                Err(e) => {
                    tracing::warn!("Ignoring special days file {}: {}", path.display(), e);
                    let error = ErrorRecord::new(ErrorKind::Parse, "Unreadable special days file")
                        .with_details(e.to_string());
                    self.replace_errors(ErrorKind::Parse, &[error]);
                    SpecialDays::default()
                }
            }
        })
    }

    fn replace_errors(&self, kind: ErrorKind, records: &[ErrorRecord]) {
        let log = self.error_log();
        if let Err(e) = log.clear(kind) {
            tracing::warn!("Could not clear {} errors: {}", kind, e);
        }
        log.record(records);
    }

    /// Events passing `filter`, in start order.
    pub fn events(&mut self, filter: &FilterSpec, today: NaiveDate) -> AgendaResult<Vec<Event>> {
        self.begin();
        let normalized = self.refresh()?;
        Ok(filter
            .apply(&normalized.events, today)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn render(&mut self, filter: &FilterSpec, today: NaiveDate) -> AgendaResult<Rendered> {
        self.begin();
        let normalized = self.refresh()?;
        let matched = filter.apply(&normalized.events, today);

        let builder = GridBuilder {
            special_days: self.special_days(),
            today,
            max_events_per_day: self.config.max_events_per_day,
        };

        Ok(Rendered {
            filter: filter.clone(),
            grids: builder.build(filter, &matched),
            glyphs: self.config.glyphs(),
            matched: matched.len(),
            total: normalized.events.len(),
        })
    }

    /// What a sync would do right now, without touching the external store.
    ///
    /// Events of a department whose source couldn't be read are left alone:
    /// its tracked entries carry over instead of being deleted.
    pub fn plan_sync(&mut self) -> AgendaResult<ReconcilePlan> {
        self.begin();
        let normalized = self.refresh()?;
        let syncable: Vec<&Event> = normalized.events.iter().filter(|e| e.is_syncable()).collect();

        let (held, tracked): (Vec<_>, Vec<_>) = self
            .tracking()
            .load()?
            .into_iter()
            .partition(|entry| normalized.unreadable.contains(&entry.department));

        if !held.is_empty() {
            tracing::warn!(
                "Keeping {} synced events of unreadable sources: {}",
                held.len(),
                normalized.unreadable.join(", ")
            );
        }

        let mut plan = plan(&tracked, &syncable);
        plan.unchanged.extend(held);
        Ok(plan)
    }

    /// Reconcile the external store with the current syncable events and
    /// persist the new tracking set.
    pub async fn sync<S: CalendarStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> AgendaResult<ReconcileOutcome> {
        let options = ExternalEventOptions {
            timezone: self.config.timezone()?,
            default_duration: self.config.event_duration()?,
        };

        let plan = self.plan_sync()?;
        tracing::info!(
            "Sync plan: {} to create, {} to delete, {} unchanged",
            plan.to_create.len(),
            plan.to_delete.len(),
            plan.unchanged.len()
        );

        let outcome = reconcile(store, plan, &options, Utc::now()).await;

        self.error_log().record(&outcome.errors);
        self.tracking().save(&outcome.entries)?;

        Ok(outcome)
    }

    /// Delete every tracked external event.
    pub async fn purge<S: CalendarStore + ?Sized>(&mut self, store: &S) -> AgendaResult<PurgeOutcome> {
        self.begin();
        let tracking = self.tracking();
        let entries = tracking.load()?;
        tracing::info!("Purging {} tracked events", entries.len());

        let outcome = purge(store, entries, DELETE_BATCH_SIZE, DELETE_BATCH_PAUSE).await;

        self.error_log().record(&outcome.errors);
        tracking.save(&outcome.remaining)?;

        Ok(outcome)
    }
}
