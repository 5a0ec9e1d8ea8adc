use std::time::Instant;

use crate::acquisition::AcquisitionTicket;
use crate::backend::DashboardBackend;
use crate::selection::SelectionTicket;
use crate::{CoreError, CorrectionDataset, TitleRecord};

/// A finished correction fetch, still tagged with the ticket it was issued for.
#[derive(Debug)]
pub struct SelectionResolution {
    pub ticket: SelectionTicket,
    pub outcome: Result<CorrectionDataset, CoreError>,
}

/// A finished acquisition call.
#[derive(Debug)]
pub struct AcquisitionResolution {
    pub ticket: AcquisitionTicket,
    pub outcome: Result<(), CoreError>,
}

/// Load the title registry once. Failures are logged and returned.
pub async fn load_registry(backend: &dyn DashboardBackend) -> Result<Vec<TitleRecord>, CoreError> {
    let start = Instant::now();
    let result = backend.list_titles().await;
    match &result {
        Ok(titles) => tracing::info!(
            titles = titles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "registry loaded"
        ),
        Err(e) => tracing::warn!(error = %e, kind = ?e.kind(), "registry load failed"),
    }
    result
}

/// Run the correction fetch for `ticket`.
///
/// Staleness is not checked here: the owner of the
/// [`SelectionController`](crate::SelectionController) decides when the
/// resolution arrives.
pub async fn fetch_corrections(
    backend: &dyn DashboardBackend,
    ticket: SelectionTicket,
) -> SelectionResolution {
    let start = Instant::now();
    let outcome = backend.corrections(ticket.number).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &outcome {
        Ok(dataset) => tracing::info!(
            number = %ticket.number,
            generation = ticket.generation,
            records = dataset.len(),
            elapsed_ms,
            "correction dataset fetched"
        ),
        Err(e) => tracing::warn!(
            number = %ticket.number,
            generation = ticket.generation,
            error = %e,
            kind = ?e.kind(),
            elapsed_ms,
            "correction dataset fetch failed"
        ),
    }
    SelectionResolution { ticket, outcome }
}

/// Run the acquisition call for `ticket`.
pub async fn run_acquisition(
    backend: &dyn DashboardBackend,
    ticket: AcquisitionTicket,
) -> AcquisitionResolution {
    let start = Instant::now();
    let outcome = backend.acquire(ticket.number).await;
    tracing::debug!(
        number = %ticket.number,
        ok = outcome.is_ok(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "acquisition call returned"
    );
    AcquisitionResolution { ticket, outcome }
}
