//! Theme system for dark/light modes

use folio_core::config::ThemeVariant;
use ratatui::style::{Color, Modifier, Style};

/// Theme definition
#[derive(Clone, Debug)]
pub struct Theme {
    pub base: Style,
    /// h1 through h6
    pub heading: [Style; 6],
    pub code: Style,
    pub link: Style,
    pub quote: Style,
    pub list_marker: Style,
    pub rule: Style,
    pub toc_border: Color,
    pub toc_active: Style,
    pub toc_selected: Style,
    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
}

impl Theme {
    /// Create a theme for the given variant
    pub fn for_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Style for a heading level, clamped to h1..h6
    pub fn heading_style(&self, level: u8) -> Style {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.heading[idx]
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        Self {
            base: Style::default().fg(Color::White),
            heading: [
                bold(Color::LightBlue).add_modifier(Modifier::UNDERLINED),
                bold(Color::LightCyan),
                bold(Color::LightGreen),
                bold(Color::LightYellow),
                bold(Color::LightMagenta),
                bold(Color::Gray),
            ],
            code: Style::default().fg(Color::Yellow),
            link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            quote: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::LightRed),
            rule: Style::default().fg(Color::DarkGray),
            toc_border: Color::DarkGray,
            toc_active: bold(Color::LightCyan),
            toc_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            status_bar_fg: Color::Black,
            status_bar_bg: Color::LightBlue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        Self {
            base: Style::default().fg(Color::Black),
            heading: [
                bold(Color::Blue).add_modifier(Modifier::UNDERLINED),
                bold(Color::Cyan),
                bold(Color::Green),
                bold(Color::Rgb(150, 100, 0)), // Dark yellow
                bold(Color::Magenta),
                bold(Color::DarkGray),
            ],
            code: Style::default().fg(Color::Rgb(150, 75, 0)), // Orange-brown
            link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            quote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::Red),
            rule: Style::default().fg(Color::Gray),
            toc_border: Color::Gray,
            toc_active: bold(Color::Blue),
            toc_selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
        }
    }
}
