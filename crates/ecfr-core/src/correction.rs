//! Correction records and their boundary validation.
//!
//! Payloads from the corrections service are decoded into [`RawCorrection`]
//! first and then converted into typed [`CorrectionRecord`]s. A single record
//! with an unparsable timestamp rejects the whole payload.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::{CoreError, Service, TitleNumber};

/// Naive date-time layouts accepted after RFC 3339 fails. Read as wall-clock
/// time in the parsing zone.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unparsable timestamp {0:?}")]
pub struct TimestampError(pub String);

/// A timestamp as received on the wire, together with its parsed instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTimestamp {
    raw: String,
    at: DateTime<Utc>,
}

impl CorrectionTimestamp {
    /// Parse with offset-less date-times read in the local zone.
    pub fn parse(raw: &str) -> Result<Self, TimestampError> {
        Self::parse_in(raw, &Local)
    }

    /// Parse with offset-less date-times read as wall-clock time in `tz`.
    /// Date-only values are always midnight UTC.
    pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<Self, TimestampError> {
        let at = parse_instant(raw, tz).ok_or_else(|| TimestampError(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            at,
        })
    }

    /// Original text, untouched.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.at
    }

    /// Milliseconds since the Unix epoch.
    pub fn millis(&self) -> i64 {
        self.at.timestamp_millis()
    }
}

impl FromStr for CorrectionTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CorrectionTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_instant<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            // A wall-clock time skipped by a DST gap has no instant.
            return tz
                .from_local_datetime(&dt)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    // Date-only values mean midnight UTC.
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Wire shape of one correction, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCorrection {
    pub id: i64,
    pub error_occurred: String,
    pub error_corrected: String,
    #[serde(default)]
    pub corrective_action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CorrectionPayload {
    ecfr_corrections: Vec<RawCorrection>,
}

/// One logged error/correction event for a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRecord {
    pub id: i64,
    pub error_occurred: CorrectionTimestamp,
    pub error_corrected: CorrectionTimestamp,
    pub corrective_action: String,
}

impl CorrectionRecord {
    pub fn parse(
        id: i64,
        error_occurred: &str,
        error_corrected: &str,
        corrective_action: impl Into<String>,
    ) -> Result<Self, TimestampError> {
        Ok(Self {
            id,
            error_occurred: error_occurred.parse()?,
            error_corrected: error_corrected.parse()?,
            corrective_action: corrective_action.into(),
        })
    }
}

impl TryFrom<RawCorrection> for CorrectionRecord {
    type Error = TimestampError;

    fn try_from(raw: RawCorrection) -> Result<Self, Self::Error> {
        Self::parse(
            raw.id,
            &raw.error_occurred,
            &raw.error_corrected,
            raw.corrective_action.unwrap_or_default(),
        )
    }
}

/// The corrections of exactly one title, in service order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionDataset {
    number: TitleNumber,
    records: Vec<CorrectionRecord>,
}

impl CorrectionDataset {
    pub fn new(number: TitleNumber, records: Vec<CorrectionRecord>) -> Self {
        Self { number, records }
    }

    /// Decode and validate a corrections service payload.
    pub fn from_json(number: TitleNumber, body: &[u8]) -> Result<Self, CoreError> {
        let payload: CorrectionPayload = serde_json::from_slice(body)
            .map_err(|e| CoreError::schema(Service::Corrections, e.to_string()))?;

        let records = payload
            .ecfr_corrections
            .into_iter()
            .map(|raw| {
                let id = raw.id;
                CorrectionRecord::try_from(raw).map_err(|e| {
                    CoreError::schema(Service::Corrections, format!("record {id}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { number, records })
    }

    pub fn number(&self) -> TitleNumber {
        self.number
    }

    pub fn records(&self) -> &[CorrectionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CorrectionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
