//! UI rendering

use crate::app::{toc_scroll_offset, App};
use folio_core::config::{TocSide, ThemeVariant};
use folio_core::TocView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const HELP: &[(&str, &str)] = &[
    ("j / k", "Scroll down / up"),
    ("Ctrl-d / Ctrl-u", "Half page down / up"),
    ("Space", "Page down"),
    ("g / G", "Top / bottom"),
    ("] / [", "Next / previous heading"),
    ("t", "Toggle table of contents"),
    ("Tab", "Focus table of contents"),
    ("Enter", "Jump to selected heading"),
    ("y", "Copy link to selected heading"),
    ("r", "Reload post"),
    ("m", "Toggle theme"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Post and sidebar
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let content_area = match app.toc_view() {
        Some(view) => {
            let toc_width = app.config.reader.toc_width;
            let (toc_area, content_area) = match app.config.reader.toc_side {
                TocSide::Left => {
                    let split = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Length(toc_width), Constraint::Min(1)])
                        .split(chunks[0]);
                    (split[0], split[1])
                }
                TocSide::Right => {
                    let split = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Min(1), Constraint::Length(toc_width)])
                        .split(chunks[0]);
                    (split[1], split[0])
                }
            };
            render_toc(frame, app, &view, toc_area);
            content_area
        }
        None => {
            app.toc_area = None;
            chunks[0]
        }
    };

    render_post(frame, app, content_area);
    render_status_bar(frame, app, chunks[1]);

    if app.show_help {
        let area = frame.area();
        render_help(frame, app, area);
    }
}

fn render_post(frame: &mut Frame, app: &App, area: Rect) {
    let height = usize::from(area.height.saturating_sub(2));
    let lines = &app.rendered.lines;
    let start = app.scroll.min(lines.len());
    let end = (start + height).min(lines.len());

    let border_style = if app.toc_focus {
        Style::default().fg(app.theme.toc_border)
    } else {
        app.theme.heading_style(1).remove_modifier(Modifier::UNDERLINED)
    };

    let widget = Paragraph::new(lines[start..end].to_vec())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", app.post.title())),
        )
        .style(app.theme.base);

    frame.render_widget(widget, area);
}

fn render_toc(frame: &mut Frame, app: &mut App, view: &TocView, area: Rect) {
    let title = if app.toc_focus { "Contents [focused]" } else { "Contents" };
    let border_style = if app.toc_focus {
        app.theme.toc_active
    } else {
        Style::default().fg(app.theme.toc_border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let inner = block.inner(area);
    app.toc_area = Some(inner);

    let offset = toc_scroll_offset(app.toc_selected, usize::from(inner.height));
    let lines: Vec<Line> = view
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(idx, entry)| {
            let text = format!("{}{}", "  ".repeat(entry.indent), entry.text);
            let style = if app.toc_focus && idx == app.toc_selected {
                app.theme.toc_selected
            } else if entry.active {
                app.theme.toc_active
            } else {
                app.theme.base
            };
            Line::from(text).style(style)
        })
        .collect();

    let widget = Paragraph::new(lines).block(block).style(app.theme.base);
    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = match &app.status_message {
        Some(message) => format!(" {}", message),
        None => status_line(app),
    };

    let status = Paragraph::new(Line::from(vec![Span::styled(
        status_text,
        Style::default()
            .fg(app.theme.status_bar_fg)
            .bg(app.theme.status_bar_bg)
            .add_modifier(Modifier::BOLD),
    )]));

    frame.render_widget(status, area);
}

fn status_line(app: &App) -> String {
    let section = app
        .active_heading()
        .map(|h| format!("  § {}", h.text))
        .unwrap_or_default();

    let total = app.rendered.line_count().max(1);
    let percent = if app.max_scroll() == 0 {
        100
    } else {
        app.scroll * 100 / app.max_scroll()
    };

    let toc_indicator = match (app.show_toc, app.toc_focus) {
        (false, _) => "",
        (true, false) => " [TOC]",
        (true, true) => " [TOC*]",
    };

    let theme_str = match app.theme_variant {
        ThemeVariant::Dark => "DARK",
        ThemeVariant::Light => "LIGHT",
    };

    #[cfg(feature = "watch")]
    let watch_str = match (&app.watcher, app.dirty_on_disk) {
        (None, _) => "",
        (Some(_), false) => "  [WATCH]",
        (Some(_), true) => "  [CHANGED]",
    };
    #[cfg(not(feature = "watch"))]
    let watch_str = "";

    format!(
        " folio  {}  {} min  {} lines  {}%{}{}  [{}]{}",
        app.post.slug,
        app.post.reading_minutes(),
        total,
        percent,
        section,
        toc_indicator,
        theme_str,
        watch_str
    )
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let width = 48.min(area.width);
    let height = (HELP.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<16}", keys), app.theme.toc_active),
                Span::styled(*action, app.theme.base),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.toc_border))
            .title(" Help "),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Config, Post};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        app.resize(width, height);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let mut config = Config::default();
        config.watch.enabled = false;
        let post = Post::from_source(
            "hello",
            "## Getting Started\n\nIntro.\n\n### Install\n\nSteps.\n",
        )
        .unwrap();
        App::new(config, post)
    }

    #[test]
    fn test_sidebar_drawn_when_wide() {
        let mut app = app();
        let text = screen(&mut app, 120, 20);
        assert!(text.contains("Contents"));
        assert!(text.contains("  Install"));
        assert!(app.toc_area.is_some());
    }

    #[test]
    fn test_sidebar_hidden_when_narrow() {
        let mut app = app();
        let text = screen(&mut app, 60, 20);
        assert!(!text.contains("Contents"));
        assert!(text.contains("## Getting Started"));
        assert!(app.toc_area.is_none());
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.toggle_help();
        let text = screen(&mut app, 120, 24);
        assert!(text.contains(" Help "));
        assert!(text.contains("Next / previous heading"));
    }

    #[test]
    fn test_status_message_replaces_status_line() {
        let mut app = app();
        app.set_status_message("Reloaded");
        let text = screen(&mut app, 120, 20);
        assert!(text.lines().last().is_some_and(|l| l.starts_with(" Reloaded")));
    }
}
