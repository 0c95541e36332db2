//! Source file watcher.

use std::path::{Path, PathBuf};

use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use regex::Regex;
use tokio::sync::mpsc;

use crate::config::WatchOptions;

/// Paths touched by one filesystem event.
pub type SourceChange = Vec<PathBuf>;

/// Watches the source tree and forwards changes that are not ignored.
pub struct SourceWatcher {
    roots: Vec<PathBuf>,
    ignored: Regex,
    options: WatchOptions,
    change_tx: mpsc::UnboundedSender<SourceChange>,
}

impl SourceWatcher {
    /// Create a watcher over `roots`.
    ///
    /// Returns the watcher and a receiver for source changes.
    pub fn new(
        roots: Vec<PathBuf>,
        options: &WatchOptions,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SourceChange>), regex::Error> {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let ignored = Regex::new(&options.ignored)?;

        Ok((
            Self {
                roots,
                ignored,
                options: options.clone(),
                change_tx,
            },
            change_rx,
        ))
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        is_ignored(&self.ignored, path)
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// Uses a polling watcher when a poll interval is configured, native
    /// filesystem events otherwise.
    pub fn run(self) -> Result<Box<dyn Watcher + Send>, notify::Error> {
        let tx = self.change_tx.clone();
        let ignored = self.ignored.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !(event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()) {
                    return;
                }
                let paths: SourceChange = event
                    .paths
                    .into_iter()
                    .filter(|p| !is_ignored(&ignored, p))
                    .collect();
                if !paths.is_empty() {
                    tracing::debug!(paths = ?paths, "Source change detected");
                    let _ = tx.send(paths);
                }
            }
            Err(e) => tracing::error!(error = ?e, "Source watch error"),
        };

        let mut watcher: Box<dyn Watcher + Send> = match self.options.poll_interval() {
            Some(interval) => Box::new(PollWatcher::new(
                handler,
                Config::default().with_poll_interval(interval),
            )?),
            None => Box::new(RecommendedWatcher::new(handler, Config::default())?),
        };

        for root in &self.roots {
            let mode = if root.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher.watch(root, mode)?;
        }

        tracing::info!(
            roots = ?self.roots,
            poll_ms = self.options.poll_ms,
            ignored = %self.ignored,
            "Source watcher started"
        );
        Ok(watcher)
    }
}

fn is_ignored(pattern: &Regex, path: &Path) -> bool {
    pattern.is_match(&path.to_string_lossy())
}
