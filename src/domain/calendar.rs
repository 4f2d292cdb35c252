//! Calendar handling for transaction dates.
//!
//! Income is stored as a bare calendar day. Expense days are pinned to noon in
//! the writer's local zone and stored as a UTC instant, so that reading them
//! back in a nearby zone lands on the same day.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::domain::common::TransactionKind;

const CALENDAR_FORMAT: &str = "%Y-%m-%d";

/// Time zone used for every "local calendar" interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The host's local zone, as reported by the operating system.
    #[default]
    System,
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(CalendarZone::Fixed)
    }

    pub fn utc() -> Self {
        FixedOffset::east_opt(0)
            .map(CalendarZone::Fixed)
            .unwrap_or_default()
    }

    /// Wall-clock time of `instant` in this zone.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            CalendarZone::System => instant.with_timezone(&chrono::Local).naive_local(),
            CalendarZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Resolves a wall-clock time in this zone to an instant. Times skipped by a
    /// DST transition fall back to reading the wall clock as UTC.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let resolved = match self {
            CalendarZone::System => chrono::Local
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            CalendarZone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(now).date()
    }
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Stored date of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransactionDate {
    Calendar(NaiveDate),
    Instant(DateTime<Utc>),
}

impl TransactionDate {
    /// Noon of `date` in `zone`, as an instant.
    pub fn local_noon(date: NaiveDate, zone: &CalendarZone) -> Self {
        TransactionDate::Instant(zone.to_utc(date.and_time(noon())))
    }

    /// Normalizes a user-picked day according to the storage rule for `kind`.
    pub fn for_kind(kind: TransactionKind, date: NaiveDate, zone: &CalendarZone) -> Self {
        match kind {
            TransactionKind::Income => TransactionDate::Calendar(date),
            TransactionKind::Expense => TransactionDate::local_noon(date, zone),
        }
    }

    /// Date used when the user leaves the date field empty.
    pub fn default_for_kind(kind: TransactionKind, now: DateTime<Utc>, zone: &CalendarZone) -> Self {
        match kind {
            TransactionKind::Income => TransactionDate::Calendar(zone.today(now)),
            TransactionKind::Expense => TransactionDate::Instant(now),
        }
    }

    /// Calendar day of this date as seen in `zone`. Bare calendar days are zone-free.
    pub fn local_date(&self, zone: &CalendarZone) -> NaiveDate {
        match self {
            TransactionDate::Calendar(date) => *date,
            TransactionDate::Instant(instant) => zone.local_datetime(*instant).date(),
        }
    }

    /// Ordering key. Bare calendar days sort as local midnight in `zone`.
    pub fn sort_key(&self, zone: &CalendarZone) -> DateTime<Utc> {
        match self {
            TransactionDate::Calendar(date) => zone.to_utc(date.and_time(NaiveTime::MIN)),
            TransactionDate::Instant(instant) => *instant,
        }
    }
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionDate::Calendar(date) => write!(f, "{}", date.format(CALENDAR_FORMAT)),
            TransactionDate::Instant(instant) => {
                f.write_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized transaction date `{0}`")]
pub struct ParseDateError(pub String);

impl FromStr for TransactionDate {
    type Err = ParseDateError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, CALENDAR_FORMAT) {
            return Ok(TransactionDate::Calendar(date));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| TransactionDate::Instant(dt.with_timezone(&Utc)))
            .map_err(|_| ParseDateError(raw.to_string()))
    }
}

impl TryFrom<String> for TransactionDate {
    type Error = ParseDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionDate> for String {
    fn from(date: TransactionDate) -> Self {
        date.to_string()
    }
}
