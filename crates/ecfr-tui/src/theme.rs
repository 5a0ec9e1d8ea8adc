use ratatui::style::{Color, Modifier, Style};

use ecfr_core::AcquisitionPhase;

/// Color theme for the TUI.
pub struct Theme {
    pub ready: Color,
    pub failed: Color,
    pub download: Color,

    pub yearly_bar: Color,
    pub delay_bar: Color,
    pub negative_delay: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Default theme: the original dashboard's green/purple affordances and chart fills.
    pub fn default_theme() -> Self {
        Self {
            ready: Color::Rgb(147, 51, 234),
            failed: Color::Rgb(239, 68, 68),
            download: Color::Rgb(22, 163, 74),

            yearly_bar: Color::Rgb(136, 132, 216),
            delay_bar: Color::Rgb(130, 202, 157),
            negative_delay: Color::Rgb(239, 68, 68),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    /// Monochrome theme for terminals without color.
    pub fn mono() -> Self {
        Self {
            ready: Color::White,
            failed: Color::White,
            download: Color::Gray,

            yearly_bar: Color::White,
            delay_bar: Color::Gray,
            negative_delay: Color::DarkGray,

            header_fg: Color::Black,
            header_bg: Color::White,
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::DarkGray,
            active: Color::White,
            spinner: Color::White,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "mono" => Self::mono(),
            _ => Self::default_theme(),
        }
    }

    pub fn acquisition_style(&self, phase: AcquisitionPhase) -> Style {
        match phase {
            AcquisitionPhase::Idle => Style::default()
                .fg(self.download)
                .add_modifier(Modifier::BOLD),
            AcquisitionPhase::Downloading => Style::default()
                .fg(self.spinner)
                .add_modifier(Modifier::BOLD),
            AcquisitionPhase::Ready => Style::default()
                .fg(self.ready)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
