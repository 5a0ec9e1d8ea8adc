use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap};

use ecfr_core::{ChartData, ChartView, CorrectionDelay, YearlyCount};

use crate::app::App;
use crate::theme::Theme;
use crate::view::spinner_char;

const YEAR_BAR_WIDTH: u16 = 6;
const DELAY_BAR_WIDTH: u16 = 10;
const BAR_GAP: u16 = 1;

/// Render the chart pane for the current selection.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Charts ");

    let message = match app.selection.view() {
        ChartView::NothingSelected => vec![Line::from(Span::styled(
            "Please select a row to view charts.",
            Style::default().fg(theme.dim),
        ))],
        ChartView::Loading => vec![Line::from(Span::styled(
            format!("{} Loading charts...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ))],
        ChartView::Failed(cause) => vec![
            Line::from(Span::styled(
                "Failed to load chart data.",
                Style::default().fg(theme.failed).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(cause.clone(), Style::default().fg(theme.dim))),
        ],
        ChartView::Ready(data) if data.is_empty() => vec![Line::from(Span::styled(
            "No corrections recorded for this title.",
            Style::default().fg(theme.dim),
        ))],
        ChartView::Ready(data) => {
            render_ready(f, theme, data, area);
            return;
        }
    };

    f.render_widget(
        Paragraph::new(message).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_ready(f: &mut Frame, theme: &Theme, data: &ChartData, area: Rect) {
    let [caption_area, charts_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
    let [yearly_area, delay_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(charts_area);

    f.render_widget(Paragraph::new(caption(theme, data)), caption_area);
    render_yearly(f, theme, &data.yearly_counts, yearly_area);
    render_delays(f, theme, &data.correction_delays, delay_area);
}

fn caption(theme: &Theme, data: &ChartData) -> Line<'static> {
    let summary = data.summary();
    let mut spans = vec![Span::styled(
        format!(" {} corrections", summary.total),
        Style::default().fg(theme.text),
    )];
    if let Some(max) = summary.max_delay {
        spans.push(Span::styled(
            format!("  longest {max} days"),
            Style::default().fg(theme.dim),
        ));
    }
    if summary.negative_delays > 0 {
        spans.push(Span::styled(
            format!(
                "  {} corrected before the recorded error date",
                summary.negative_delays
            ),
            Style::default().fg(theme.negative_delay),
        ));
    }
    Line::from(spans)
}

/// How many bars of `bar_width` fit inside a bordered block of `area`.
fn bars_that_fit(area: Rect, bar_width: u16) -> usize {
    let inner = area.width.saturating_sub(2);
    ((inner + BAR_GAP) / (bar_width + BAR_GAP)).max(1) as usize
}

/// Keep the most recent `fit` entries and describe the cut in the title.
fn tail_window<'d, T>(items: &'d [T], fit: usize, title: &str) -> (&'d [T], String) {
    if items.len() <= fit {
        return (items, format!(" {title} "));
    }
    let shown = &items[items.len() - fit..];
    (
        shown,
        format!(" {title} (latest {} of {}) ", shown.len(), items.len()),
    )
}

fn render_yearly(f: &mut Frame, theme: &Theme, counts: &[YearlyCount], area: Rect) {
    let (shown, title) = tail_window(
        counts,
        bars_that_fit(area, YEAR_BAR_WIDTH),
        "Corrections Per Year",
    );
    let bars: Vec<Bar> = shown
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.count as u64)
                .label(Line::from(c.year.to_string()))
                .style(Style::default().fg(theme.yearly_bar))
                .value_style(Style::default().fg(theme.header_fg).bg(theme.yearly_bar))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(YEAR_BAR_WIDTH)
        .bar_gap(BAR_GAP);
    f.render_widget(chart, area);
}

fn render_delays(f: &mut Frame, theme: &Theme, delays: &[CorrectionDelay], area: Rect) {
    let (shown, title) = tail_window(
        delays,
        bars_that_fit(area, DELAY_BAR_WIDTH),
        "Days to Correct Over Time",
    );
    let bars: Vec<Bar> = shown.iter().map(|d| delay_bar(theme, d)).collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(DELAY_BAR_WIDTH)
        .bar_gap(BAR_GAP);
    f.render_widget(chart, area);
}

/// Bars cannot go below the axis, so a negative delay is drawn empty with its
/// value printed in the warning color.
fn delay_bar(theme: &Theme, delay: &CorrectionDelay) -> Bar<'static> {
    let label: String = delay.corrected_date.chars().take(10).collect();
    let bar = Bar::default()
        .label(Line::from(label))
        .text_value(delay.days_to_correct.to_string());
    if delay.days_to_correct < 0 {
        bar.value(0)
            .style(Style::default().fg(theme.negative_delay))
            .value_style(Style::default().fg(theme.negative_delay))
    } else {
        bar.value(delay.days_to_correct as u64)
            .style(Style::default().fg(theme.delay_bar))
            .value_style(Style::default().fg(theme.header_fg).bg(theme.delay_bar))
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use ecfr_core::{CorrectionDataset, TitleNumber, TitleRecord};

    use super::*;

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render_in(f, app, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn empty_dataset_shows_message_instead_of_charts() {
        let mut app = App::new(Theme::mono());
        let ticket = app
            .selection
            .select(Some(TitleRecord::new(3, "The President")))
            .unwrap();
        assert!(app
            .selection
            .resolve(ticket, Ok(CorrectionDataset::new(TitleNumber(3), vec![]))));

        let text = rendered_text(&app);
        assert!(text.contains("No corrections recorded for this title."));
        assert!(!text.contains("Corrections Per Year"));
    }

    #[test]
    fn nothing_selected_prompts_for_a_row() {
        let app = App::new(Theme::default_theme());
        assert!(rendered_text(&app).contains("Please select a row to view charts."));
    }

    #[test]
    fn tail_window_keeps_latest_entries() {
        let items = [1, 2, 3, 4, 5];
        let (shown, title) = tail_window(&items, 3, "Days");
        assert_eq!(shown, &[3, 4, 5]);
        assert_eq!(title, " Days (latest 3 of 5) ");

        let (shown, title) = tail_window(&items, 10, "Days");
        assert_eq!(shown.len(), 5);
        assert_eq!(title, " Days ");
    }

    #[test]
    fn bar_fit_accounts_for_borders_and_gaps() {
        let area = Rect::new(0, 0, 24, 10);
        // 22 inner columns, 6 wide + 1 gap: three bars
        assert_eq!(bars_that_fit(area, 6), 3);
        assert_eq!(bars_that_fit(Rect::new(0, 0, 2, 2), 6), 1);
    }
}
