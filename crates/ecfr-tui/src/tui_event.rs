use ecfr_core::{
    AcquisitionResolution, AcquisitionTicket, CoreError, SelectionResolution, SelectionTicket,
    TitleRecord,
};

/// Commands sent from the TUI to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    /// Fetch the title registry.
    LoadRegistry,
    /// Trigger acquisition for a row that just entered `Downloading`.
    Acquire(AcquisitionTicket),
    /// Fetch corrections for the selection identified by the ticket.
    FetchCorrections(SelectionTicket),
}

/// Events flowing from backend tasks to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    RegistryLoaded(Result<Vec<TitleRecord>, CoreError>),
    AcquisitionFinished(AcquisitionResolution),
    CorrectionsFetched(SelectionResolution),
}
