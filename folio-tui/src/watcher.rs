//! Watching the open post for external edits

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use log::{debug, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Debounced change notifications for a single post file
pub struct PostWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<()>,
    path: PathBuf,
    last_event: Option<Instant>,
}

impl PostWatcher {
    pub fn new(path: &Path) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let path = path.to_path_buf();
        let target = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                        && event.paths.iter().any(|p| p == &target);
                    if relevant {
                        let _ = tx.send(());
                    }
                }
                Err(err) => warn!("file watch error: {}", err),
            }
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch file: {}", path.display()))?;

        // Editors that save by rename replace the file, so watch the directory too
        if let Some(parent) = path.parent() {
            watcher
                .watch(parent, RecursiveMode::NonRecursive)
                .context("Failed to watch parent directory")?;
        }

        debug!("watching {}", path.display());
        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path,
            last_event: None,
        })
    }

    /// True once a change has been seen and `debounce` has passed since the last one
    pub fn poll_changed(&mut self, debounce: Duration) -> bool {
        while self.receiver.try_recv().is_ok() {
            self.last_event = Some(Instant::now());
        }

        match self.last_event {
            Some(last) if last.elapsed() >= debounce => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
