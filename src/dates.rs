//! Date normalization for timestamp cells.
//!
//! Form exports store timestamps either as spreadsheet serial numbers
//! (days since the 1900 epoch plus a fractional time of day) or as text.
//! Everything here works in naive local wall-clock time.

use crate::config::{DateStyle, DatesConfig};
use crate::types::Cell;
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Largest serial the 1900 date system can represent (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

/// Largest magnitude a millisecond timestamp may have (+/- 100,000,000 days)
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const SECONDS_PER_DAY: i64 = 86_400;

/// Result of normalizing one raw cell
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedDate {
    /// The cell holds no value; never parsed
    Missing,
    Parsed(NaiveDateTime),
    /// Not a real calendar instant; carries the raw value for display
    Unparseable(String),
}

impl NormalizedDate {
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            NormalizedDate::Parsed(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Decode a 1900-system spreadsheet serial into a timestamp.
///
/// Serial 60 is the phantom 1900-02-29 and rolls over to 1900-03-01.
/// Returns `None` outside the representable range.
pub fn decode_serial(value: f64) -> Option<NaiveDateTime> {
    if !(0.0..=MAX_SERIAL).contains(&value) {
        return None;
    }

    let mut days = value.trunc() as i64;
    let exact_seconds = value.fract() * SECONDS_PER_DAY as f64;
    let mut seconds = exact_seconds.floor() as i64;
    if exact_seconds - seconds as f64 > 0.9999 {
        seconds += 1;
        if seconds == SECONDS_PER_DAY {
            seconds = 0;
            days += 1;
        }
    }

    let epoch = if days < 61 { NaiveDate::from_ymd_opt(1899, 12, 31)? } else { NaiveDate::from_ymd_opt(1899, 12, 30)? };
    let date = epoch.checked_add_days(Days::new(days as u64))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)?;
    Some(date.and_time(time))
}

/// Interpret a number as milliseconds since the Unix epoch, in local time
fn from_epoch_millis(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() || value.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    Local.timestamp_millis_opt(value.trunc() as i64).earliest().map(|dt| dt.naive_local())
}

/// Converts raw cells into timestamps and formats them for display
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    formats: Vec<String>,
    style: DateStyle,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::from_config(&DatesConfig::default())
    }
}

impl DateNormalizer {
    pub fn from_config(config: &DatesConfig) -> Self {
        Self { formats: config.formats.clone(), style: config.style }
    }

    pub fn normalize(&self, cell: &Cell) -> NormalizedDate {
        if cell.is_blank() {
            return NormalizedDate::Missing;
        }

        let parsed = match cell {
            Cell::Number(n) => decode_serial(*n).or_else(|| from_epoch_millis(*n)),
            Cell::Text(s) => self.parse_text(s),
            Cell::Empty => return NormalizedDate::Missing,
        };

        match parsed {
            Some(ts) => NormalizedDate::Parsed(ts),
            None => NormalizedDate::Unparseable(cell.display()),
        }
    }

    fn parse_text(&self, raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Local).naive_local());
        }

        for format in &self.formats {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
                return Some(ts);
            }
            if let Ok(day) = NaiveDate::parse_from_str(s, format) {
                return day.and_hms_opt(0, 0, 0);
            }
        }

        None
    }

    /// Format a timestamp in the configured style
    pub fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        match self.style {
            DateStyle::Full => ts.format("%d/%m/%Y %H:%M:%S").to_string(),
            DateStyle::Date => ts.format("%d/%m/%Y").to_string(),
        }
    }

    /// Display form of a raw cell: formatted date, `N/A` when missing,
    /// the raw value when it is not a date
    pub fn format_cell(&self, cell: &Cell) -> String {
        match self.normalize(cell) {
            NormalizedDate::Parsed(ts) => self.format_timestamp(&ts),
            NormalizedDate::Missing => "N/A".to_string(),
            NormalizedDate::Unparseable(raw) => raw,
        }
    }
}

#[cfg(test)]
#[path = "dates_test.rs"]
mod dates_test;
