mod backend;
mod update;

use ratatui::layout::{Constraint, Layout};
use tokio::sync::mpsc;

use ecfr_core::{AcquisitionTracker, SelectionController, TitleRecord};

use crate::model::registry::RegistryState;
use crate::theme::Theme;
use crate::tui_event::BackendCommand;

/// Root application state.
pub struct App {
    /// Registry rows in the order the service returned them.
    pub rows: Vec<TitleRecord>,
    pub registry: RegistryState,
    pub cursor: usize,
    pub acquisitions: AcquisitionTracker,
    pub selection: SelectionController,
    pub theme: Theme,
    pub tick: usize,
    pub should_quit: bool,
    pub show_help: bool,
    /// Transient status line; registry state is shown when empty.
    pub status: Option<String>,
    pub visible_rows: usize,
    /// Channel for issuing commands to the backend listener.
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            rows: Vec::new(),
            registry: RegistryState::Loading,
            cursor: 0,
            acquisitions: AcquisitionTracker::new(),
            selection: SelectionController::new(),
            theme,
            tick: 0,
            should_quit: false,
            show_help: false,
            status: None,
            visible_rows: 20,
            backend_cmd_tx: None,
        }
    }

    /// Kick off the one-time registry load.
    pub fn request_registry(&mut self) {
        self.registry = RegistryState::Loading;
        if !self.send_command(BackendCommand::LoadRegistry) {
            self.status = Some("Backend unavailable".to_string());
        }
    }

    /// Send a command to the backend. Returns false when no listener is attached.
    fn send_command(&self, cmd: BackendCommand) -> bool {
        match &self.backend_cmd_tx {
            Some(tx) => tx.send(cmd).is_ok(),
            None => false,
        }
    }

    pub fn current_row(&self) -> Option<&TitleRecord> {
        self.rows.get(self.cursor)
    }

    pub fn is_selected(&self, record: &TitleRecord) -> bool {
        self.selection
            .selected()
            .is_some_and(|s| s.number == record.number)
    }

    /// Render the whole dashboard into the frame.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        let [title_area, table_area, chart_area, status_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(45),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        // Table body loses two rows to borders and one to the header.
        self.visible_rows = (table_area.height as usize).saturating_sub(3).max(1);

        crate::view::render_title_bar(f, self, title_area);
        crate::view::table::render_in(f, self, table_area);
        crate::view::charts::render_in(f, self, chart_area);
        crate::view::render_status_line(f, self, status_area);
        crate::view::render_footer(f, self, footer_area);

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}
