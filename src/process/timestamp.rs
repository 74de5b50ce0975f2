// src/process/timestamp.rs
use anyhow::Result;
use arrow::{
    array::{ArrayRef, Int32Array, TimestampSecondArray},
    datatypes::{DataType, Field, TimeUnit},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    fixups::Fixups,
    utils::{append_columns, string_column},
    DATETIME_UTC, INCIDENT_DATE, INCIDENT_TIME, YEAR,
};

/// `1900-01-01T00:00:00Z`, stamped on rows whose date is missing or unusable.
pub const SENTINEL_SECS: i64 = -2_208_988_800;

/// Arrow timezone of `datetime_utc`. A fixed offset needs no tz database.
pub const UTC_OFFSET: &str = "+00:00";

const MIDNIGHT: &str = "0000";

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%d-%b-%y", "%d-%b-%Y"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub fn sentinel() -> DateTime<Utc> {
    DateTime::from_timestamp(SENTINEL_SECS, 0).unwrap_or_default()
}

/// Calendar date of a raw date cell; any time of day on it is dropped.
/// Two-digit years are tried before four-digit ones so `3/4/16` is 2016.
pub fn parse_incident_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Four-digit `HHMM` clock token for a raw time cell, and whether it had to
/// fall back to midnight.
pub fn time_token(raw: Option<&str>, fixups: &Fixups) -> (String, bool) {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() && !fixups.is_problem_time(s) => s,
        _ => return (MIDNIGHT.to_string(), true),
    };
    match coerce_clock(raw) {
        Some(token) => (token, false),
        None => (MIDNIGHT.to_string(), true),
    }
}

/// `530`, `"0530"` and `"530.0"` all become `"0530"`. Anything that is not a
/// non-negative integer naming a real clock time yields `None`, including a
/// fractional value such as `"530.5"`; it is not truncated.
fn coerce_clock(raw: &str) -> Option<String> {
    let n: i64 = raw.parse().ok().or_else(|| {
        let f: f64 = raw.parse().ok()?;
        (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
    })?;
    if !(0..=2359).contains(&n) || n % 100 > 59 {
        return None;
    }
    Some(format!("{:04}", n))
}

/// Result of stamping one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    pub datetime: DateTime<Utc>,
    pub year: Option<i32>,
    pub unknown_date: bool,
    pub defaulted_time: bool,
}

/// Combine a raw date and time into one UTC instant. Never fails: a missing,
/// blacklisted or unparseable date gives the sentinel, a bad time gives
/// midnight. `year` comes from the date cell alone.
pub fn stamp(date: Option<&str>, time: Option<&str>, fixups: &Fixups) -> Stamp {
    let year = date.and_then(parse_incident_date).map(|d| d.year());

    let day = match date {
        Some(d) if !fixups.is_problem_date(d) => parse_incident_date(d),
        _ => None,
    };
    let Some(day) = day else {
        return Stamp {
            datetime: sentinel(),
            year,
            unknown_date: true,
            defaulted_time: false,
        };
    };

    let (token, defaulted_time) = time_token(time, fixups);
    let (hh, mm) = token.split_at(2);
    let clock = hh
        .parse()
        .ok()
        .zip(mm.parse().ok())
        .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .unwrap_or(NaiveTime::MIN);

    Stamp {
        datetime: day.and_time(clock).and_utc(),
        year,
        unknown_date: false,
        defaulted_time,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimestampStats {
    pub rows: usize,
    pub unknown_dates: usize,
    pub defaulted_times: usize,
}

/// Append `datetime_utc` and `year` to the combined table.
#[tracing::instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn add_timestamps(batch: &RecordBatch, fixups: &Fixups) -> Result<(RecordBatch, TimestampStats)> {
    let dates = string_column(batch, INCIDENT_DATE)?;
    let times = string_column(batch, INCIDENT_TIME)?;

    let mut stats = TimestampStats {
        rows: batch.num_rows(),
        ..Default::default()
    };
    let mut secs = Vec::with_capacity(batch.num_rows());
    let mut years = Vec::with_capacity(batch.num_rows());

    for (date, time) in dates.iter().zip(times.iter()) {
        let s = stamp(date, time, fixups);
        if s.unknown_date {
            stats.unknown_dates += 1;
        }
        if s.defaulted_time {
            stats.defaulted_times += 1;
        }
        secs.push(s.datetime.timestamp());
        years.push(s.year);
    }

    if stats.unknown_dates > 0 {
        warn!(count = stats.unknown_dates, "rows stamped with the unknown-date sentinel");
    }
    info!(defaulted_times = stats.defaulted_times, "timestamps derived");

    let datetime = TimestampSecondArray::from(secs).with_timezone(UTC_OFFSET);
    let out = append_columns(
        batch,
        vec![
            (
                Field::new(
                    DATETIME_UTC,
                    DataType::Timestamp(TimeUnit::Second, Some(UTC_OFFSET.into())),
                    false,
                ),
                Arc::new(datetime) as ArrayRef,
            ),
            (
                Field::new(YEAR, DataType::Int32, true),
                Arc::new(Int32Array::from(years)) as ArrayRef,
            ),
        ],
    )?;
    Ok((out, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{canonical_schema, CANONICAL_HEADERS};
    use arrow::array::{Array, StringArray};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn numeric_time_is_zero_padded() {
        let f = Fixups::default();
        assert_eq!(time_token(Some("530"), &f), ("0530".to_string(), false));
        assert_eq!(time_token(Some("530.0"), &f), ("0530".to_string(), false));
        assert_eq!(time_token(Some("0005"), &f), ("0005".to_string(), false));
        assert_eq!(
            stamp(Some("2016-03-04"), Some("530"), &f).datetime,
            at("2016-03-04T05:30:00Z")
        );
    }

    #[test]
    fn absent_or_bad_time_falls_back_to_midnight() {
        let f = Fixups::default();
        for raw in [None, Some(""), Some("  "), Some("UNKN"), Some("5:30"), Some("2400"), Some("1275"), Some("-5")] {
            let s = stamp(Some("2019-07-01"), raw, &f);
            assert_eq!(s.datetime, at("2019-07-01T00:00:00Z"), "time {:?}", raw);
            assert!(s.defaulted_time);
            assert!(!s.unknown_date);
        }
    }

    #[test]
    fn fractional_clock_values_are_not_truncated() {
        let f = Fixups::default();
        assert_eq!(coerce_clock("530.5"), None);
        assert_eq!(time_token(Some("530.5"), &f), ("0000".to_string(), true));
        let s = stamp(Some("2019-07-01"), Some("530.5"), &f);
        assert_eq!(s.datetime, at("2019-07-01T00:00:00Z"));
        assert!(s.defaulted_time);
    }

    #[test]
    fn date_time_component_is_discarded() {
        let f = Fixups::default();
        let s = stamp(Some("2015-08-09 13:45:00"), Some("2210"), &f);
        assert_eq!(s.datetime, at("2015-08-09T22:10:00Z"));
        assert_eq!(s.year, Some(2015));
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2016, 3, 4);
        assert_eq!(parse_incident_date("2016-03-04"), d);
        assert_eq!(parse_incident_date("3/4/2016"), d);
        assert_eq!(parse_incident_date("3/4/16"), d);
        assert_eq!(parse_incident_date("04-Mar-2016"), d);
        assert_eq!(parse_incident_date("2016-03-04T08:00:00"), d);
        assert_eq!(parse_incident_date("sometime in march"), None);
    }

    #[test]
    fn unknown_dates_get_the_sentinel() {
        let f = Fixups::default();
        for raw in [None, Some(""), Some("UNKN"), Some("2/29/2015"), Some("garbage")] {
            let s = stamp(raw, Some("1200"), &f);
            assert_eq!(s.datetime, sentinel(), "date {:?}", raw);
            assert!(s.unknown_date);
            assert_eq!(s.year, None);
        }
        assert_eq!(sentinel(), at("1900-01-01T00:00:00Z"));
    }

    #[test]
    fn year_follows_the_date_cell_even_when_blacklisted() {
        let mut f = Fixups::default();
        f.problem_dates.push("2018-01-01".into());
        let s = stamp(Some("2018-01-01"), Some("0100"), &f);
        assert_eq!(s.datetime, sentinel());
        assert_eq!(s.year, Some(2018));
    }

    #[test]
    fn add_timestamps_appends_non_null_columns() -> Result<()> {
        let n = 3;
        let mut columns: Vec<ArrayRef> = Vec::new();
        for h in CANONICAL_HEADERS {
            let col = match h {
                INCIDENT_DATE => StringArray::from(vec![Some("2016-03-04"), None, Some("2019-07-01")]),
                INCIDENT_TIME => StringArray::from(vec![Some("530"), Some("0100"), None]),
                _ => StringArray::from(vec![None::<&str>; n]),
            };
            columns.push(Arc::new(col));
        }
        let batch = RecordBatch::try_new(canonical_schema(), columns)?;

        let (out, stats) = add_timestamps(&batch, &Fixups::default())?;
        assert_eq!(out.num_columns(), CANONICAL_HEADERS.len() + 2);
        assert_eq!(
            stats,
            TimestampStats {
                rows: 3,
                unknown_dates: 1,
                defaulted_times: 1
            }
        );

        let dt = out
            .column_by_name(DATETIME_UTC)
            .unwrap()
            .as_any()
            .downcast_ref::<TimestampSecondArray>()
            .unwrap();
        assert_eq!(dt.null_count(), 0);
        assert_eq!(dt.value(0), at("2016-03-04T05:30:00Z").timestamp());
        assert_eq!(dt.value(1), SENTINEL_SECS);
        assert_eq!(dt.value(2), at("2019-07-01T00:00:00Z").timestamp());

        let years = out
            .column_by_name(YEAR)
            .unwrap()
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(years.value(0), 2016);
        assert!(years.is_null(1));
        Ok(())
    }
}
