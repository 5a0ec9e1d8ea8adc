use ecfr_core::AcquisitionPhase;

use super::App;
use crate::model::registry::RegistryState;
use crate::tui_event::BackendEvent;

impl App {
    /// Process a backend event and update model state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::RegistryLoaded(Ok(titles)) => {
                for title in &titles {
                    self.acquisitions.observe(title);
                }
                self.rows = titles;
                self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
                self.registry = RegistryState::Loaded;
            }
            BackendEvent::RegistryLoaded(Err(e)) => {
                // Table stays empty; the status line carries the cause.
                self.rows.clear();
                self.cursor = 0;
                self.registry = RegistryState::failed(&e);
            }
            BackendEvent::AcquisitionFinished(resolution) => {
                let number = resolution.ticket.number;
                match self.acquisitions.apply(resolution) {
                    AcquisitionPhase::Ready => {
                        self.status = Some(format!("Title {number} ready, press Enter for charts"));
                    }
                    AcquisitionPhase::Idle => {
                        let cause = self
                            .acquisitions
                            .last_error(number)
                            .unwrap_or("unknown error");
                        self.status = Some(format!("Download of title {number} failed: {cause}"));
                    }
                    AcquisitionPhase::Downloading => {}
                }
            }
            BackendEvent::CorrectionsFetched(resolution) => {
                // Stale results are dropped inside the controller.
                self.selection.apply(resolution);
            }
        }
    }
}
