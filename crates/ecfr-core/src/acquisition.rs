//! Per-row acquisition state machine.
//!
//! Each title moves `Idle -> Downloading -> {Ready, Idle}`. `Ready` is
//! absorbing, and a title that arrives with a checksum starts there. Rows are
//! independent of one another.

use std::collections::HashMap;

use crate::orchestrator::AcquisitionResolution;
use crate::{CoreError, TitleNumber, TitleRecord};

/// Acquisition phase of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPhase {
    Idle,
    Downloading,
    Ready,
}

impl AcquisitionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Download",
            Self::Downloading => "Downloading...",
            Self::Ready => "Charts",
        }
    }
}

/// Mutable acquisition flags for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAcquisition {
    /// An acquisition call is in flight.
    pub downloading: bool,
    /// Acquisition succeeded or the title already had a checksum.
    pub chart_eligible: bool,
    /// Message from the last failed attempt, cleared on the next attempt.
    pub last_error: Option<String>,
}

impl RowAcquisition {
    pub fn phase(&self) -> AcquisitionPhase {
        if self.chart_eligible {
            AcquisitionPhase::Ready
        } else if self.downloading {
            AcquisitionPhase::Downloading
        } else {
            AcquisitionPhase::Idle
        }
    }
}

/// Proof that a row entered `Downloading`; hand it back to [`AcquisitionTracker::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionTicket {
    pub number: TitleNumber,
}

/// Acquisition state for every row seen this session.
#[derive(Debug, Default)]
pub struct AcquisitionTracker {
    rows: HashMap<TitleNumber, RowAcquisition>,
}

impl AcquisitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a row (idempotent). A checksum makes the row chart-eligible.
    pub fn observe(&mut self, record: &TitleRecord) -> &RowAcquisition {
        let row = self.rows.entry(record.number).or_default();
        if record.has_checksum() {
            row.chart_eligible = true;
        }
        row
    }

    pub fn row(&self, number: TitleNumber) -> Option<&RowAcquisition> {
        self.rows.get(&number)
    }

    pub fn phase(&self, record: &TitleRecord) -> AcquisitionPhase {
        if record.has_checksum() {
            return AcquisitionPhase::Ready;
        }
        self.rows
            .get(&record.number)
            .map(RowAcquisition::phase)
            .unwrap_or(AcquisitionPhase::Idle)
    }

    pub fn is_chart_eligible(&self, record: &TitleRecord) -> bool {
        self.phase(record) == AcquisitionPhase::Ready
    }

    pub fn last_error(&self, number: TitleNumber) -> Option<&str> {
        self.rows.get(&number).and_then(|r| r.last_error.as_deref())
    }

    /// Move the row to `Downloading`.
    ///
    /// Returns `None` without touching state when the row already has data or
    /// is mid-download, so repeated triggers issue at most one call.
    pub fn begin(&mut self, record: &TitleRecord) -> Option<AcquisitionTicket> {
        let row = self.rows.entry(record.number).or_default();
        if record.has_checksum() {
            row.chart_eligible = true;
        }
        if row.chart_eligible || row.downloading {
            tracing::debug!(
                number = %record.number,
                phase = ?row.phase(),
                "acquisition trigger ignored"
            );
            return None;
        }
        row.downloading = true;
        row.last_error = None;
        tracing::debug!(number = %record.number, "acquisition started");
        Some(AcquisitionTicket {
            number: record.number,
        })
    }

    /// Leave `Downloading`: success makes the row `Ready`, failure returns it
    /// to `Idle` so it can be retried.
    pub fn finish(
        &mut self,
        ticket: AcquisitionTicket,
        outcome: Result<(), CoreError>,
    ) -> AcquisitionPhase {
        let row = self.rows.entry(ticket.number).or_default();
        if !row.downloading {
            tracing::warn!(number = %ticket.number, "acquisition result for a row that is not downloading");
            return row.phase();
        }
        row.downloading = false;
        match outcome {
            Ok(()) => {
                row.chart_eligible = true;
                row.last_error = None;
                tracing::info!(number = %ticket.number, "acquisition succeeded");
            }
            Err(e) => {
                tracing::warn!(number = %ticket.number, error = %e, kind = ?e.kind(), "acquisition failed");
                row.last_error = Some(e.to_string());
            }
        }
        row.phase()
    }

    pub fn apply(&mut self, resolution: AcquisitionResolution) -> AcquisitionPhase {
        self.finish(resolution.ticket, resolution.outcome)
    }
}
