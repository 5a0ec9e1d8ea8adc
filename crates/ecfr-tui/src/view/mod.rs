pub mod charts;
pub mod help;
pub mod table;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::model::registry::RegistryState;

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate to `max_width` characters, appending "\u{2026}" if anything was cut.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

pub fn render_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        " eCFR Corrections Dashboard ",
        theme.header_style(),
    )];
    if app.registry == RegistryState::Loaded {
        spans.push(Span::styled(
            format!("  {} titles", app.rows.len()),
            Style::default().fg(theme.dim),
        ));
    }
    if let Some(selected) = app.selection.selected() {
        spans.push(Span::styled(
            format!("  Title {}: {}", selected.number, selected.name),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Status line: the last transient message, or the registry state.
pub fn render_status_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = match (&app.status, &app.registry) {
        (Some(status), _) => Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(theme.text),
        )),
        (None, RegistryState::Failed { .. }) => Line::from(Span::styled(
            format!(" {}", app.registry.label()),
            Style::default().fg(theme.failed),
        )),
        (None, RegistryState::Loading) => Line::from(Span::styled(
            format!(" {} {}", spinner_char(app.tick), app.registry.label()),
            Style::default().fg(theme.spinner),
        )),
        (None, RegistryState::Loaded) => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hint = " j/k:move  d:download  Enter:charts  Esc:clear  ?:help  q:quit";
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, app.theme.footer_style()))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Protection of Environment", 10), "Protectio\u{2026}");
        assert_eq!(truncate("Energy", 10), "Energy");
        assert_eq!(truncate("Énergie élect", 7), "Énergi\u{2026}");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn spinner_wraps() {
        assert_eq!(spinner_char(0), spinner_char(SPINNER_FRAMES.len()));
    }
}
