use ecfr_core::{AcquisitionPhase, AcquisitionTracker, CoreError, FailureKind, TitleRecord};

/// Load state of the title registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryState {
    Loading,
    Loaded,
    Failed { kind: FailureKind, message: String },
}

impl RegistryState {
    pub fn failed(err: &CoreError) -> Self {
        Self::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Loading => "Loading titles...".to_string(),
            Self::Loaded => "Titles loaded".to_string(),
            Self::Failed {
                kind: FailureKind::Schema,
                message,
            } => format!("Title registry returned unexpected data: {message}"),
            Self::Failed { message, .. } => format!("Failed to load titles: {message}"),
        }
    }
}

/// What the Action column shows for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAffordance {
    Download,
    Downloading,
    Charts,
    /// Charts for the row that is currently selected.
    Viewing,
}

impl RowAffordance {
    pub fn for_row(
        record: &TitleRecord,
        acquisitions: &AcquisitionTracker,
        selected: bool,
    ) -> Self {
        match acquisitions.phase(record) {
            AcquisitionPhase::Idle => Self::Download,
            AcquisitionPhase::Downloading => Self::Downloading,
            AcquisitionPhase::Ready if selected => Self::Viewing,
            AcquisitionPhase::Ready => Self::Charts,
        }
    }

    pub fn phase(&self) -> AcquisitionPhase {
        match self {
            Self::Download => AcquisitionPhase::Idle,
            Self::Downloading => AcquisitionPhase::Downloading,
            Self::Charts | Self::Viewing => AcquisitionPhase::Ready,
        }
    }

    pub fn key_hint(&self) -> &'static str {
        match self {
            Self::Download => "[d]",
            Self::Downloading => "",
            Self::Charts => "[\u{23CE}]",
            Self::Viewing => "",
        }
    }
}

/// Format the Word column. The registry may omit the count.
pub fn format_word(word: Option<u64>) -> String {
    match word {
        None => "-".to_string(),
        Some(n) => {
            let digits = n.to_string();
            let mut out = String::with_capacity(digits.len() + digits.len() / 3);
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    out.push(',');
                }
                out.push(ch);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecfr_core::Service;

    #[test]
    fn word_counts_are_grouped() {
        assert_eq!(format_word(None), "-");
        assert_eq!(format_word(Some(0)), "0");
        assert_eq!(format_word(Some(999)), "999");
        assert_eq!(format_word(Some(1000)), "1,000");
        assert_eq!(format_word(Some(1234567)), "1,234,567");
    }

    #[test]
    fn checksum_rows_offer_charts() {
        let tracker = AcquisitionTracker::new();
        let record = TitleRecord::new(1, "General Provisions").with_checksum("abc123def456");
        assert_eq!(
            RowAffordance::for_row(&record, &tracker, false),
            RowAffordance::Charts
        );
        assert_eq!(
            RowAffordance::for_row(&record, &tracker, true),
            RowAffordance::Viewing
        );
    }

    #[test]
    fn rows_without_checksum_offer_download() {
        let tracker = AcquisitionTracker::new();
        let record = TitleRecord::new(2, "Grants and Agreements");
        assert_eq!(
            RowAffordance::for_row(&record, &tracker, true),
            RowAffordance::Download
        );
    }

    #[test]
    fn schema_failures_are_labelled_differently() {
        let state = RegistryState::failed(&CoreError::schema(Service::Registry, "missing field `titles`"));
        assert!(state.label().starts_with("Title registry returned unexpected data"));
        let state = RegistryState::failed(&CoreError::Status {
            service: Service::Registry,
            status: 502,
        });
        assert!(state.label().starts_with("Failed to load titles"));
    }
}
