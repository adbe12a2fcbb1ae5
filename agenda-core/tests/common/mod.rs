//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use agenda_core::error::{AgendaError, AgendaResult};
use agenda_core::remote::{CalendarStore, DeleteOutcome};
use agenda_core::sync::ExternalEvent;
use agenda_core::{Event, Flag, SourceRowRef};
use async_trait::async_trait;
use chrono::NaiveDate;

/// In-memory external calendar with switchable failures.
#[derive(Default)]
pub struct FakeCalendar {
    pub events: Mutex<HashMap<String, ExternalEvent>>,
    next_id: AtomicUsize,
    pub creates: AtomicUsize,
    pub deletes: AtomicUsize,
    /// Summaries whose create fails.
    pub failing_creates: Mutex<HashSet<String>>,
    /// External ids whose delete fails.
    pub failing_deletes: Mutex<HashSet<String>>,
}

impl FakeCalendar {
    pub fn summaries(&self) -> Vec<String> {
        let mut summaries: Vec<_> = self
            .events
            .lock()
            .unwrap()
            .values()
            .map(|e| e.summary.clone())
            .collect();
        summaries.sort();
        summaries
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarStore for FakeCalendar {
    async fn create_event(&self, event: &ExternalEvent) -> AgendaResult<String> {
        if self.failing_creates.lock().unwrap().contains(&event.summary) {
            return Err(AgendaError::Provider("quota exceeded".into()));
        }

        self.creates.fetch_add(1, Ordering::SeqCst);
        let id = format!("ext-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.events.lock().unwrap().insert(id.clone(), event.clone());
        Ok(id)
    }

    async fn delete_event(&self, event_id: &str) -> AgendaResult<DeleteOutcome> {
        if self.failing_deletes.lock().unwrap().contains(event_id) {
            return Err(AgendaError::ProviderTimeout(10));
        }

        self.deletes.fetch_add(1, Ordering::SeqCst);
        match self.events.lock().unwrap().remove(event_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::AlreadyGone),
        }
    }
}

pub fn on_site_event(title: &str, day: u32) -> Event {
    Event {
        department: "Vie scolaire".to_string(),
        start: NaiveDate::from_ymd_opt(2025, 10, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        end: None,
        has_time: false,
        service: "CPE".to_string(),
        title: title.to_string(),
        on_site: true,
        on_external_calendar: true,
        on_external_calendar_raw: Flag::Yes,
        source_row: SourceRowRef {
            source: "Vie scolaire".to_string(),
            row: day as usize + 1,
        },
    }
}
