//! Single-row selection and the chart state that follows it.
//!
//! Every call to [`SelectionController::select`] bumps a generation counter.
//! A correction fetch carries the [`SelectionTicket`] it was issued with and
//! may only apply its outcome while that ticket is still current.

use crate::metrics::ChartData;
use crate::orchestrator::SelectionResolution;
use crate::{CoreError, CorrectionDataset, TitleNumber, TitleRecord};

/// Identity of one correction fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    pub number: TitleNumber,
    pub generation: u64,
}

/// What the chart area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartView {
    NothingSelected,
    Loading,
    Failed(String),
    Ready(ChartData),
}

impl ChartView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn chart_data(&self) -> Option<&ChartData> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SelectionController {
    selected: Option<TitleRecord>,
    generation: u64,
    view: ChartView,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self {
            selected: None,
            generation: 0,
            view: ChartView::NothingSelected,
        }
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&TitleRecord> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> &ChartView {
        &self.view
    }

    /// Replace the selection.
    ///
    /// `Some` enters `Loading` and returns the ticket for exactly one
    /// correction fetch, even when the same record is selected again. `None`
    /// clears the selection and the chart without a fetch. Either way any
    /// outstanding ticket stops being current.
    pub fn select(&mut self, record: Option<TitleRecord>) -> Option<SelectionTicket> {
        self.generation += 1;
        match record {
            None => {
                tracing::debug!(generation = self.generation, "selection cleared");
                self.selected = None;
                self.view = ChartView::NothingSelected;
                None
            }
            Some(record) => {
                let ticket = SelectionTicket {
                    number: record.number,
                    generation: self.generation,
                };
                tracing::debug!(
                    number = %ticket.number,
                    generation = ticket.generation,
                    "selection changed, fetching corrections"
                );
                self.selected = Some(record);
                self.view = ChartView::Loading;
                Some(ticket)
            }
        }
    }

    /// Whether a fetch issued with `ticket` may still apply its result.
    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        ticket.generation == self.generation
            && self
                .selected
                .as_ref()
                .is_some_and(|s| s.number == ticket.number)
    }

    /// Apply a fetch outcome. Returns `false` when the ticket is stale and the
    /// outcome was dropped.
    pub fn resolve(
        &mut self,
        ticket: SelectionTicket,
        outcome: Result<CorrectionDataset, CoreError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                number = %ticket.number,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale correction fetch"
            );
            return false;
        }
        self.view = match outcome {
            Ok(dataset) => ChartView::Ready(ChartData::from_dataset(&dataset)),
            Err(e) => ChartView::Failed(e.to_string()),
        };
        true
    }

    pub fn apply(&mut self, resolution: SelectionResolution) -> bool {
        self.resolve(resolution.ticket, resolution.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::CorrectionRecord;
    use crate::{FailureKind, Service};

    fn dataset(number: u32, corrected: &[&str]) -> CorrectionDataset {
        let records = corrected
            .iter()
            .enumerate()
            .map(|(i, c)| CorrectionRecord::parse(i as i64, "2019-06-01", c, "fix").unwrap())
            .collect();
        CorrectionDataset::new(TitleNumber(number), records)
    }

    #[test]
    fn starts_with_nothing_selected() {
        let controller = SelectionController::new();
        assert!(controller.selected().is_none());
        assert_eq!(controller.view(), &ChartView::NothingSelected);
    }

    #[test]
    fn select_enters_loading_then_ready() {
        let mut controller = SelectionController::new();
        let ticket = controller
            .select(Some(TitleRecord::new(7, "Agriculture")))
            .unwrap();
        assert_eq!(ticket.number, TitleNumber(7));
        assert!(controller.view().is_loading());

        assert!(controller.resolve(ticket, Ok(dataset(7, &["2020-01-10", "2021-05-03"]))));
        let data = controller.view().chart_data().unwrap();
        assert_eq!(data.yearly_counts.len(), 2);
        assert_eq!(data.correction_delays.len(), 2);
    }

    #[test]
    fn failure_clears_chart_and_records_error() {
        let mut controller = SelectionController::new();
        let ticket = controller.select(Some(TitleRecord::new(7, "Agriculture"))).unwrap();
        let err = CoreError::Status {
            service: Service::Corrections,
            status: 404,
        };
        assert!(controller.resolve(ticket, Err(err)));
        assert!(controller.view().chart_data().is_none());
        assert!(controller.view().error().unwrap().contains("404"));
    }

    #[test]
    fn late_result_for_previous_selection_is_discarded() {
        let mut controller = SelectionController::new();
        let a = controller.select(Some(TitleRecord::new(1, "A"))).unwrap();
        let b = controller.select(Some(TitleRecord::new(2, "B"))).unwrap();

        assert!(controller.resolve(b, Ok(dataset(2, &["2022-02-02"]))));
        assert!(!controller.resolve(a, Ok(dataset(1, &["2010-01-01", "2011-01-01"]))));

        let data = controller.view().chart_data().unwrap();
        assert_eq!(data.yearly_counts.len(), 1);
        assert_eq!(data.yearly_counts[0].year, 2022);
        assert_eq!(controller.selected().unwrap().number, TitleNumber(2));
    }

    #[test]
    fn stale_failure_does_not_replace_loading() {
        let mut controller = SelectionController::new();
        let a = controller.select(Some(TitleRecord::new(1, "A"))).unwrap();
        let _b = controller.select(Some(TitleRecord::new(2, "B"))).unwrap();

        let err = CoreError::schema(Service::Corrections, "bad");
        assert_eq!(err.kind(), FailureKind::Schema);
        assert!(!controller.resolve(a, Err(err)));
        assert!(controller.view().is_loading());
    }

    #[test]
    fn reselecting_same_record_issues_fresh_ticket() {
        let mut controller = SelectionController::new();
        let record = TitleRecord::new(3, "The President");
        let first = controller.select(Some(record.clone())).unwrap();
        let second = controller.select(Some(record)).unwrap();

        assert_eq!(first.number, second.number);
        assert_ne!(first.generation, second.generation);
        assert!(!controller.is_current(first));
        assert!(controller.is_current(second));
        assert!(!controller.resolve(first, Ok(dataset(3, &["2020-01-01"]))));
        assert!(controller.view().is_loading());
    }

    #[test]
    fn deselect_clears_everything_and_invalidates_fetch() {
        let mut controller = SelectionController::new();
        let ticket = controller.select(Some(TitleRecord::new(1, "A"))).unwrap();
        assert!(controller.select(None).is_none());

        assert!(controller.selected().is_none());
        assert_eq!(controller.view(), &ChartView::NothingSelected);
        assert!(!controller.resolve(ticket, Ok(dataset(1, &["2020-01-01"]))));
        assert_eq!(controller.view(), &ChartView::NothingSelected);
    }

    #[test]
    fn deselect_after_ready_drops_chart_data() {
        let mut controller = SelectionController::new();
        let ticket = controller.select(Some(TitleRecord::new(1, "A"))).unwrap();
        controller.resolve(ticket, Ok(dataset(1, &["2020-01-01"])));
        assert!(controller.view().chart_data().is_some());

        controller.select(None);
        assert!(controller.view().chart_data().is_none());
        assert!(controller.view().error().is_none());
        assert!(!controller.view().is_loading());
    }
}
