//! Chart series derived from a correction dataset.

use std::collections::BTreeMap;

use chrono::{Datelike, Local, TimeZone};
use serde::Serialize;

use crate::correction::{CorrectionDataset, CorrectionTimestamp};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Number of corrections whose correction timestamp falls in `year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearlyCount {
    pub year: i32,
    pub count: usize,
}

/// Whole days between an error and its correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionDelay {
    /// The `error_corrected` text exactly as received.
    pub corrected_date: String,
    /// Negative when the correction predates the error.
    pub days_to_correct: i64,
}

/// Corrections per calendar year of `error_corrected`, in the local time zone.
pub fn yearly_counts(dataset: &CorrectionDataset) -> Vec<YearlyCount> {
    yearly_counts_in(dataset, &Local)
}

/// Corrections per calendar year of `error_corrected` as seen in `tz`,
/// ascending by year.
pub fn yearly_counts_in<Tz: TimeZone>(dataset: &CorrectionDataset, tz: &Tz) -> Vec<YearlyCount> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for record in dataset.iter() {
        let year = record.error_corrected.instant().with_timezone(tz).year();
        *by_year.entry(year).or_default() += 1;
    }
    by_year
        .into_iter()
        .map(|(year, count)| YearlyCount { year, count })
        .collect()
}

/// `floor((corrected - occurred) / 1 day)` on millisecond timestamps.
pub fn days_to_correct(occurred: &CorrectionTimestamp, corrected: &CorrectionTimestamp) -> i64 {
    (corrected.millis() - occurred.millis()).div_euclid(MILLIS_PER_DAY)
}

/// One delay per record, ordered by correction instant. Ties keep dataset order.
pub fn correction_delays(dataset: &CorrectionDataset) -> Vec<CorrectionDelay> {
    let mut delays: Vec<(i64, CorrectionDelay)> = dataset
        .iter()
        .map(|record| {
            (
                record.error_corrected.millis(),
                CorrectionDelay {
                    corrected_date: record.error_corrected.as_str().to_string(),
                    days_to_correct: days_to_correct(
                        &record.error_occurred,
                        &record.error_corrected,
                    ),
                },
            )
        })
        .collect();
    // sort_by_key is stable
    delays.sort_by_key(|(at, _)| *at);
    delays.into_iter().map(|(_, delay)| delay).collect()
}

/// Both chart series for one title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartData {
    pub yearly_counts: Vec<YearlyCount>,
    pub correction_delays: Vec<CorrectionDelay>,
}

/// Caption figures shown above the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartSummary {
    pub total: usize,
    pub negative_delays: usize,
    pub max_delay: Option<i64>,
}

impl ChartData {
    pub fn from_dataset(dataset: &CorrectionDataset) -> Self {
        Self {
            yearly_counts: yearly_counts(dataset),
            correction_delays: correction_delays(dataset),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.yearly_counts.is_empty() && self.correction_delays.is_empty()
    }

    pub fn summary(&self) -> ChartSummary {
        ChartSummary {
            total: self.correction_delays.len(),
            negative_delays: self
                .correction_delays
                .iter()
                .filter(|d| d.days_to_correct < 0)
                .count(),
            max_delay: self
                .correction_delays
                .iter()
                .map(|d| d.days_to_correct)
                .max(),
        }
    }
}
