//! Provider-neutral representation of a mirrored event.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    /// All-day. As an end bound this is exclusive.
    Date(NaiveDate),
    /// Wall-clock time in a named IANA zone.
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

/// The event as handed to the external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

/// How events are shaped for the external calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalEventOptions {
    pub timezone: Tz,
    /// Length of a timed event that has no end.
    pub default_duration: Duration,
}

impl ExternalEvent {
    pub fn from_event(event: &Event, options: &ExternalEventOptions) -> Self {
        let (start, end) = if event.has_time {
            let end = event
                .end
                .unwrap_or(event.start + options.default_duration);
            let zoned = |datetime| EventTime::DateTimeZoned {
                datetime,
                tzid: options.timezone.name().to_string(),
            };
            (zoned(event.start), zoned(end))
        } else {
            let last = event.end.unwrap_or(event.start).date();
            let exclusive_end = last.succ_opt().unwrap_or(last);
            (EventTime::Date(event.date()), EventTime::Date(exclusive_end))
        };

        ExternalEvent {
            summary: event.title.clone(),
            description: format!(
                "Service: {}\nDepartment: {}",
                event.service, event.department
            ),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Flag, SourceRowRef};

    fn options() -> ExternalEventOptions {
        ExternalEventOptions {
            timezone: chrono_tz::Europe::Paris,
            default_duration: Duration::hours(1),
        }
    }

    fn event(start: NaiveDateTime, end: Option<NaiveDateTime>, has_time: bool) -> Event {
        Event {
            department: "Sport".to_string(),
            start,
            end,
            has_time,
            service: "EPS".to_string(),
            title: "Cross".to_string(),
            on_site: true,
            on_external_calendar: true,
            on_external_calendar_raw: Flag::Yes,
            source_row: SourceRowRef {
                source: "Sport".to_string(),
                row: 3,
            },
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn all_day_end_is_exclusive() {
        let single = ExternalEvent::from_event(&event(day(10).and_hms_opt(0, 0, 0).unwrap(), None, false), &options());
        assert_eq!(single.start, EventTime::Date(day(10)));
        assert_eq!(single.end, EventTime::Date(day(11)));

        let span = ExternalEvent::from_event(
            &event(
                day(10).and_hms_opt(0, 0, 0).unwrap(),
                Some(day(12).and_hms_opt(0, 0, 0).unwrap()),
                false,
            ),
            &options(),
        );
        assert_eq!(span.end, EventTime::Date(day(13)));
    }

    #[test]
    fn timed_event_defaults_to_one_hour_in_zone() {
        let start = day(10).and_hms_opt(14, 30, 0).unwrap();
        let external = ExternalEvent::from_event(&event(start, None, true), &options());

        assert_eq!(
            external.end,
            EventTime::DateTimeZoned {
                datetime: day(10).and_hms_opt(15, 30, 0).unwrap(),
                tzid: "Europe/Paris".to_string(),
            }
        );
        assert_eq!(external.summary, "Cross");
        assert!(external.description.contains("EPS"));
        assert!(external.description.contains("Sport"));
    }

    #[test]
    fn serializes_for_providers() {
        let start = day(10).and_hms_opt(14, 30, 0).unwrap();
        let external = ExternalEvent::from_event(&event(start, None, true), &options());
        let json = serde_json::to_value(&external).unwrap();
        assert_eq!(json["start"]["date_time_zoned"]["tzid"], "Europe/Paris");
    }
}
