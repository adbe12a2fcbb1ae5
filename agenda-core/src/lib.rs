//! Core of agenda: reads department event tables, normalizes them, lays them
//! out as calendar grids and mirrors on-site events to an external calendar.

pub mod agenda;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_log;
pub mod event;
pub mod filter;
pub mod grid;
pub mod normalize;
pub mod remote;
pub mod scheduler;
pub mod source;
pub mod special_days;
pub mod sync;
pub mod utils;

pub use agenda::{Agenda, Rendered};
pub use error::{AgendaError, AgendaResult};
pub use event::{Event, Flag, SourceRowRef};
