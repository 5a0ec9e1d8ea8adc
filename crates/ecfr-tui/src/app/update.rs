use ecfr_core::{AcquisitionPhase, CoreError};

use super::App;
use crate::action::Action;
use crate::tui_event::BackendCommand;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        // Help overlay swallows everything except quit and its own toggles
        if self.show_help {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::ToggleHelp | Action::ClearSelection => self.show_help = false,
                Action::Tick => self.tick = self.tick.wrapping_add(1),
                _ => {}
            }
            return false;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::MoveDown => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            Action::GoTop => self.cursor = 0,
            Action::GoBottom => self.cursor = self.rows.len().saturating_sub(1),
            Action::PageDown => {
                let last = self.rows.len().saturating_sub(1);
                self.cursor = (self.cursor + self.visible_rows).min(last);
            }
            Action::PageUp => {
                self.cursor = self.cursor.saturating_sub(self.visible_rows);
            }
            Action::Download => self.start_download(),
            Action::ShowCharts => self.show_charts(),
            Action::ClearSelection => {
                if self.selection.selected().is_some() {
                    self.selection.select(None);
                    self.status = None;
                }
            }
            Action::ToggleHelp => self.show_help = true,
            Action::Tick => self.tick = self.tick.wrapping_add(1),
            Action::Resize(_, _) | Action::None => {}
        }
        false
    }

    fn start_download(&mut self) {
        let Some(record) = self.current_row().cloned() else {
            return;
        };
        let Some(ticket) = self.acquisitions.begin(&record) else {
            if self.acquisitions.phase(&record) == AcquisitionPhase::Ready {
                self.status = Some(format!(
                    "Title {} is already available, press Enter for charts",
                    record.number
                ));
            }
            return;
        };
        if self.send_command(BackendCommand::Acquire(ticket)) {
            self.status = Some(format!("Downloading title {}...", record.number));
        } else {
            // No listener will ever answer; release the row so it can be retried.
            self.acquisitions.finish(
                ticket,
                Err(CoreError::Transport("backend unavailable".to_string())),
            );
            self.status = Some("Backend unavailable".to_string());
        }
    }

    fn show_charts(&mut self) {
        let Some(record) = self.current_row().cloned() else {
            return;
        };
        if !self.acquisitions.is_chart_eligible(&record) {
            self.status = Some(format!(
                "Title {} has no data yet, press d to download it",
                record.number
            ));
            return;
        }
        let number = record.number;
        if let Some(ticket) = self.selection.select(Some(record)) {
            self.status = None;
            if !self.send_command(BackendCommand::FetchCorrections(ticket)) {
                self.selection.resolve(
                    ticket,
                    Err(CoreError::Transport("backend unavailable".to_string())),
                );
                tracing::warn!(%number, "correction fetch not dispatched");
            }
        }
    }
}
