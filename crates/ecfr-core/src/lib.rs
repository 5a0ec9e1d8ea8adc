use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod acquisition;
pub mod backend;
pub mod config_file;
pub mod correction;
pub mod metrics;
pub mod orchestrator;
pub mod selection;

// Re-export for convenience
pub use acquisition::{AcquisitionPhase, AcquisitionTicket, AcquisitionTracker, RowAcquisition};
pub use backend::DashboardBackend;
pub use backend::http::HttpBackend;
pub use correction::{CorrectionDataset, CorrectionRecord, CorrectionTimestamp, TimestampError};
pub use metrics::{
    ChartData, ChartSummary, CorrectionDelay, YearlyCount, correction_delays, yearly_counts,
    yearly_counts_in,
};
pub use orchestrator::{AcquisitionResolution, SelectionResolution};
pub use selection::{ChartView, SelectionController, SelectionTicket};

pub const DEFAULT_REGISTRY_URL: &str = "https://get-titles-info-788903804860.us-central1.run.app";
pub const DEFAULT_ACQUISITION_URL: &str =
    "https://ecfr-data-downloader-788903804860.europe-west1.run.app";
pub const DEFAULT_CORRECTIONS_URL: &str =
    "https://get-corrections-788903804860.us-central1.run.app";

/// Stable key of a title across the registry, the acquisition rows and the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleNumber(pub u32);

impl fmt::Display for TitleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the title registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub number: TitleNumber,
    pub name: String,
    /// Present once the title's data has been acquired.
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub word: Option<u64>,
    #[serde(default)]
    pub latest_amended_on: Option<NaiveDate>,
    #[serde(default)]
    pub latest_issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub up_to_date_as_of: Option<NaiveDate>,
    #[serde(default)]
    pub reserved: bool,
}

impl TitleRecord {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number: TitleNumber(number),
            name: name.into(),
            checksum: None,
            word: None,
            latest_amended_on: None,
            latest_issue_date: None,
            up_to_date_as_of: None,
            reserved: false,
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// An empty checksum string counts as absent.
    pub fn has_checksum(&self) -> bool {
        self.checksum.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Last six characters of the checksum, used as a short visual tag.
    pub fn checksum_tag(&self) -> Option<&str> {
        let checksum = self.checksum.as_deref().filter(|c| !c.is_empty())?;
        let start = checksum
            .char_indices()
            .rev()
            .nth(5)
            .map(|(i, _)| i)
            .unwrap_or(0);
        Some(&checksum[start..])
    }
}

/// The three remote services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Registry,
    Acquisition,
    Corrections,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Registry => "registry",
            Service::Acquisition => "acquisition",
            Service::Corrections => "corrections",
        };
        f.write_str(name)
    }
}

/// Coarse failure taxonomy surfaced to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call did not complete or returned a non-success status.
    Transport,
    /// The call completed but the payload did not match the expected shape.
    Schema,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} service returned HTTP {status}")]
    Status { service: Service, status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed {service} response: {message}")]
    Schema { service: Service, message: String },
}

impl CoreError {
    pub fn schema(service: Service, message: impl Into<String>) -> Self {
        CoreError::Schema {
            service,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::Http(e) if e.is_decode() => FailureKind::Schema,
            CoreError::Http(_) | CoreError::Status { .. } | CoreError::Transport(_) => {
                FailureKind::Transport
            }
            CoreError::Schema { .. } => FailureKind::Schema,
        }
    }
}

/// Service endpoints. The acquisition and corrections services are keyed by
/// title number appended as the last path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub registry_url: String,
    pub acquisition_url: String,
    pub corrections_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            acquisition_url: DEFAULT_ACQUISITION_URL.to_string(),
            corrections_url: DEFAULT_CORRECTIONS_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn acquisition_for(&self, number: TitleNumber) -> String {
        format!("{}/{}", self.acquisition_url.trim_end_matches('/'), number)
    }

    pub fn corrections_for(&self, number: TitleNumber) -> String {
        format!("{}/{}", self.corrections_url.trim_end_matches('/'), number)
    }
}

/// Runtime configuration for the dashboard backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoints: Endpoints,
    /// `None` leaves requests without a deadline.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            request_timeout: None,
            user_agent: format!("ecfr-dashboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
