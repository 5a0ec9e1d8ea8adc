use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ecfr_core::DashboardBackend;
use ecfr_core::orchestrator::{fetch_corrections, load_registry, run_acquisition};

use crate::tui_event::{BackendCommand, BackendEvent};

/// Receive commands from the UI and run each one as its own task.
///
/// Tasks are never aborted when the selection changes: the app discards stale
/// results by ticket. Cancelling `cancel` stops accepting commands at shutdown.
pub async fn run_command_listener(
    backend: Arc<dyn DashboardBackend>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    event_tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        let backend = Arc::clone(&backend);
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let event = match cmd {
                BackendCommand::LoadRegistry => {
                    BackendEvent::RegistryLoaded(load_registry(backend.as_ref()).await)
                }
                BackendCommand::Acquire(ticket) => BackendEvent::AcquisitionFinished(
                    run_acquisition(backend.as_ref(), ticket).await,
                ),
                BackendCommand::FetchCorrections(ticket) => BackendEvent::CorrectionsFetched(
                    fetch_corrections(backend.as_ref(), ticket).await,
                ),
            };
            // Receiver is gone only when the UI has exited.
            let _ = tx.send(event);
        });
    }
    tracing::debug!("backend command listener stopped");
}
