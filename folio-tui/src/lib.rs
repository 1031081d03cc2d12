//! Folio TUI - Terminal reader for blog posts
//!
//! This crate contains all ratatui/crossterm integration:
//! - App state and the active-heading tracker wiring
//! - Event loop and input handling
//! - Post layout, sidebar and status bar rendering
//! - Theme system

pub mod app;
pub mod input;
pub mod layout;
pub mod terminal;
pub mod theme;
pub mod ui;

#[cfg(feature = "watch")]
pub mod watcher;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use std::time::{Duration, Instant};

// Re-export main types
pub use app::App;

/// Frame interval while a smooth scroll is running
const ANIMATION_FRAME: Duration = Duration::from_millis(16);
/// Poll interval when idle
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Run the TUI application
pub fn run(mut app: App) -> Result<()> {
    let mut terminal = terminal::init().context("Failed to initialize terminal")?;

    let result = run_loop(&mut terminal, &mut app);

    // Always restore terminal, even if run_loop fails
    terminal::restore().context("Failed to restore terminal")?;

    result
}

fn run_loop(terminal: &mut terminal::Tui, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size().context("Failed to read terminal size")?;
        app.resize(size.width, size.height);

        terminal
            .draw(|frame| ui::draw(frame, app))
            .context("Failed to draw frame")?;

        if app.should_quit {
            break;
        }

        let timeout = if app.is_animating() {
            ANIMATION_FRAME
        } else {
            IDLE_POLL
        };

        if crossterm::event::poll(timeout).context("Failed to poll events")? {
            match crossterm::event::read().context("Failed to read event")? {
                // Only handle key press events, ignore release
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key)?;
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        app.tick(Instant::now());

        #[cfg(feature = "watch")]
        app.check_watcher();
    }

    Ok(())
}
