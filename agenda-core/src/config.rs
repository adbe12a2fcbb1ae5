//! Global agenda configuration at `~/.config/agenda/config.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EVENT_DURATION, DEFAULT_MAX_EVENTS_PER_DAY, DEFAULT_SYNC_QUIET_PERIOD,
    DEFAULT_TIMEZONE, ERROR_LOG_FILE, TRACKING_FILE,
};
use crate::error::{AgendaError, AgendaResult};
use crate::grid::DepartmentGlyphs;
use crate::remote::Remote;

static DEFAULT_SOURCES_DIR: &str = "~/agenda/sources";
static DEFAULT_DATA_DIR: &str = "~/agenda/.agenda";
static DEFAULT_SPECIAL_DAYS: &str = "~/agenda/special_days.toml";

fn default_sources_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCES_DIR)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_special_days() -> PathBuf {
    PathBuf::from(DEFAULT_SPECIAL_DAYS)
}

fn default_max_events_per_day() -> usize {
    DEFAULT_MAX_EVENTS_PER_DAY
}

fn default_sync_quiet_period() -> String {
    DEFAULT_SYNC_QUIET_PERIOD.to_string()
}

fn default_event_duration() -> String {
    DEFAULT_EVENT_DURATION.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgendaConfig {
    /// Directory holding one CSV source per department.
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,

    /// Where tracking.csv and errors.csv live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_special_days")]
    pub special_days: PathBuf,

    /// IANA zone for event wall-clock times. Defaults to the system zone.
    pub timezone: Option<String>,

    #[serde(default = "default_max_events_per_day")]
    pub max_events_per_day: usize,

    #[serde(default = "default_sync_quiet_period")]
    pub sync_quiet_period: String,

    #[serde(default = "default_event_duration")]
    pub default_event_duration: String,

    /// Department name to glyph.
    #[serde(default)]
    pub departments: HashMap<String, String>,

    pub remote: Option<Remote>,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            sources_dir: default_sources_dir(),
            data_dir: default_data_dir(),
            special_days: default_special_days(),
            timezone: None,
            max_events_per_day: default_max_events_per_day(),
            sync_quiet_period: default_sync_quiet_period(),
            default_event_duration: default_event_duration(),
            departments: HashMap::new(),
            remote: None,
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, creating a commented default file on first
    /// run. `AGENDA_*` environment variables override file values.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("AGENDA").try_parsing(true))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// Load a config file on its own, without environment overrides.
    pub fn from_file(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# One CSV file per department:
# sources_dir = \"{DEFAULT_SOURCES_DIR}\"

# Sync tracking and error log:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Public holidays, school breaks and staff absences:
# special_days = \"{DEFAULT_SPECIAL_DAYS}\"

# Defaults to the system time zone:
# timezone = \"{DEFAULT_TIMEZONE}\"

# max_events_per_day = {DEFAULT_MAX_EVENTS_PER_DAY}
# sync_quiet_period = \"{DEFAULT_SYNC_QUIET_PERIOD}\"
# default_event_duration = \"{DEFAULT_EVENT_DURATION}\"

# [departments]
# \"Musique\" = \"🎵\"

# [remote]
# provider = \"google\"
# google_account = \"you@example.org\"
# calendar_id = \"primary\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn sources_path(&self) -> PathBuf {
        expand(&self.sources_dir)
    }

    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn special_days_path(&self) -> PathBuf {
        expand(&self.special_days)
    }

    pub fn tracking_path(&self) -> PathBuf {
        self.data_path().join(TRACKING_FILE)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.data_path().join(ERROR_LOG_FILE)
    }

    /// Configured zone, else the system zone, else Europe/Paris.
    pub fn timezone(&self) -> AgendaResult<Tz> {
        if let Some(name) = &self.timezone {
            return name
                .parse()
                .map_err(|_| AgendaError::Config(format!("Unknown timezone '{name}'")));
        }

        let system = iana_time_zone::get_timezone().ok();
        Ok(system
            .and_then(|name| name.parse().ok())
            .unwrap_or(chrono_tz::Europe::Paris))
    }

    pub fn quiet_period(&self) -> AgendaResult<Duration> {
        humantime::parse_duration(&self.sync_quiet_period).map_err(|e| {
            AgendaError::Config(format!(
                "Invalid sync_quiet_period '{}': {e}",
                self.sync_quiet_period
            ))
        })
    }

    pub fn event_duration(&self) -> AgendaResult<chrono::Duration> {
        let duration = humantime::parse_duration(&self.default_event_duration).map_err(|e| {
            AgendaError::Config(format!(
                "Invalid default_event_duration '{}': {e}",
                self.default_event_duration
            ))
        })?;

        chrono::Duration::from_std(duration)
            .map_err(|e| AgendaError::Config(format!("default_event_duration: {e}")))
    }

    pub fn glyphs(&self) -> DepartmentGlyphs {
        DepartmentGlyphs::new(self.departments.clone())
    }

    pub fn remote(&self) -> AgendaResult<&Remote> {
        self.remote.as_ref().ok_or(AgendaError::NoRemoteConfigured)
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
