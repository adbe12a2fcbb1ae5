//! Date/time cell parsing.
//!
//! Cells arrive either as spreadsheet serial numbers (days since 1899-12-30,
//! fraction = time of day) or as typed text. In both cases we need to know
//! whether the value carries a time of day or is a pure calendar date.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDateTime {
    pub value: NaiveDateTime,
    /// True if the cell carries a non-midnight time of day.
    pub has_time: bool,
}

/// Parse a non-empty date/time cell. Returns `None` if it isn't a date.
pub fn parse_cell(raw: &str) -> Option<CellDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    parse_serial(raw).or_else(|| parse_text(raw))
}

fn parse_serial(raw: &str) -> Option<CellDateTime> {
    if !raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let serial: f64 = raw.replace(',', ".").parse().ok()?;
    if !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.trunc() as i64;
    let mut seconds = (serial.fract() * SECONDS_PER_DAY as f64).round() as i64;
    let mut days = days;
    if seconds >= SECONDS_PER_DAY {
        days += 1;
        seconds = 0;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let value = epoch + Duration::days(days) + Duration::seconds(seconds);

    Some(CellDateTime {
        value,
        has_time: seconds != 0,
    })
}

fn parse_text(raw: &str) -> Option<CellDateTime> {
    let (date_part, time_part) = match raw.find(['T', ' ']) {
        Some(i) => (&raw[..i], Some(raw[i + 1..].trim())),
        None => (raw, None),
    };

    let date = parse_date(date_part)?;
    let time = match time_part {
        Some(t) if !t.is_empty() => parse_time(t)?,
        _ => NaiveTime::MIN,
    };

    Some(CellDateTime {
        value: date.and_time(time),
        has_time: time != NaiveTime::MIN,
    })
}

/// `YYYY-MM-DD`, `DD/MM/YYYY`, `DD/MM/YY` or `DD.MM.YYYY`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    let sep = if s.contains('/') {
        '/'
    } else if s.contains('.') {
        '.'
    } else {
        return None;
    };

    let parts: Vec<&str> = s.split(sep).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut y: i32 = year.parse().ok()?;
    match year.len() {
        2 => y += 2000,
        4 => {}
        _ => return None,
    }

    NaiveDate::from_ymd_opt(y, month, day)
}

/// `HH:MM`, `HH:MM:SS` (optionally fractional), or French `14h30` / `14h`.
fn parse_time(s: &str) -> Option<NaiveTime> {
    for fmt in ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }

    let lower = s.to_ascii_lowercase();
    let (hours, minutes) = lower.split_once('h')?;
    let hour: u32 = hours.trim().parse().ok()?;
    let minute: u32 = if minutes.trim().is_empty() {
        0
    } else {
        minutes.trim().parse().ok()?
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn iso_date_is_pure_date() {
        let parsed = parse_cell("2025-09-12").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 0, 0));
        assert!(!parsed.has_time);
    }

    #[test]
    fn iso_datetime_has_time() {
        let parsed = parse_cell("2025-09-12T14:30").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 14, 30));
        assert!(parsed.has_time);

        let parsed = parse_cell("2025-09-12 08:05:00").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 8, 5));
        assert!(parsed.has_time);
    }

    #[test]
    fn explicit_midnight_counts_as_pure_date() {
        let parsed = parse_cell("2025-09-12 00:00").unwrap();
        assert!(!parsed.has_time);
    }

    #[test]
    fn french_formats() {
        assert_eq!(parse_cell("12/09/2025").unwrap().value, dt(2025, 9, 12, 0, 0));
        assert_eq!(parse_cell("12/09/25").unwrap().value, dt(2025, 9, 12, 0, 0));
        assert_eq!(parse_cell("12.09.2025").unwrap().value, dt(2025, 9, 12, 0, 0));

        let parsed = parse_cell("12/09/2025 18h30").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 18, 30));
        assert!(parsed.has_time);

        assert_eq!(
            parse_cell("12/09/2025 9h").unwrap().value,
            dt(2025, 9, 12, 9, 0)
        );
    }

    #[test]
    fn serial_without_fraction_is_pure_date() {
        // 45912 = 2025-09-12
        let parsed = parse_cell("45912").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 0, 0));
        assert!(!parsed.has_time);
    }

    #[test]
    fn serial_fraction_is_time_of_day() {
        let parsed = parse_cell("45912.625").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 15, 0));
        assert!(parsed.has_time);

        let parsed = parse_cell("45912,5").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 12, 12, 0));
    }

    #[test]
    fn serial_fraction_rounding_to_next_day() {
        let parsed = parse_cell("45912.9999999").unwrap();
        assert_eq!(parsed.value, dt(2025, 9, 13, 0, 0));
        assert!(!parsed.has_time);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_cell("TBD").is_none());
        assert!(parse_cell("").is_none());
        assert!(parse_cell("31/02/2025").is_none());
        assert!(parse_cell("2025-09-12 25:00").is_none());
        assert!(parse_cell("12/09/202").is_none());
        assert!(parse_cell("0").is_none());
    }
}
