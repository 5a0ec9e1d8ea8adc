use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use ecfr_core::TitleRecord;

use crate::app::App;
use crate::model::registry::{RegistryState, RowAffordance, format_word};
use crate::view::{spinner_char, truncate};

const CHECKSUM_WIDTH: usize = 20;

/// Render the title registry table.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Titles ");

    if app.rows.is_empty() {
        let message = match &app.registry {
            RegistryState::Loading => Line::from(Span::styled(
                format!(" {} {}", spinner_char(app.tick), app.registry.label()),
                Style::default().fg(theme.spinner),
            )),
            RegistryState::Failed { .. } => Line::from(Span::styled(
                format!(" {}", app.registry.label()),
                Style::default().fg(theme.failed),
            )),
            RegistryState::Loaded => Line::from(Span::styled(
                " The registry returned no titles.",
                Style::default().fg(theme.dim),
            )),
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Number"),
        Cell::from("Name"),
        Cell::from("Word"),
        Cell::from("Checksum"),
        Cell::from("Action"),
    ])
    .style(theme.header_style())
    .height(1);

    // Width left for the name column after fixed columns and borders
    let name_width = (area.width as usize).saturating_sub(8 + 12 + CHECKSUM_WIDTH + 20 + 10);

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|record| title_row(app, record, name_width))
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(CHECKSUM_WIDTH as u16),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn title_row(app: &App, record: &TitleRecord, name_width: usize) -> Row<'static> {
    let theme = &app.theme;
    let selected = app.is_selected(record);
    let affordance = RowAffordance::for_row(record, &app.acquisitions, selected);

    let number_style = if selected {
        Style::default().fg(theme.active).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    let marker = if selected { "\u{25B6}" } else { " " };

    let name_style = if record.reserved {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.text)
    };

    let checksum_cell = match (record.checksum.as_deref(), record.checksum_tag()) {
        (Some(checksum), Some(tag)) if record.has_checksum() => {
            let head_width = CHECKSUM_WIDTH.saturating_sub(tag.chars().count() + 3);
            Cell::from(Line::from(vec![
                Span::styled(truncate(checksum, head_width), Style::default().fg(theme.dim)),
                Span::raw(" "),
                Span::styled(tag.to_string(), Style::default().fg(theme.ready)),
            ]))
        }
        _ => Cell::from(Span::styled("-", Style::default().fg(theme.dim))),
    };

    let action_style = theme.acquisition_style(affordance.phase());
    let action_text = match affordance {
        RowAffordance::Downloading => {
            format!("{} Downloading...", spinner_char(app.tick))
        }
        RowAffordance::Viewing => "Charts \u{25C0}".to_string(),
        other => format!("{} {}", other.phase().label(), other.key_hint()),
    };
    let mut action_spans = vec![Span::styled(action_text, action_style)];
    if affordance == RowAffordance::Download && app.acquisitions.last_error(record.number).is_some()
    {
        action_spans.push(Span::styled(" !", Style::default().fg(theme.failed)));
    }

    Row::new(vec![
        Cell::from(Span::styled(
            format!("{marker}{:>5}", record.number.0),
            number_style,
        )),
        Cell::from(Span::styled(truncate(&record.name, name_width.max(20)), name_style)),
        Cell::from(Span::styled(
            format_word(record.word),
            Style::default().fg(theme.dim),
        )),
        checksum_cell,
        Cell::from(Line::from(action_spans)),
    ])
}
