//! Hot reload: page invalidation and client notification.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::observability::metrics;
use crate::pages::PageRegistry;
use crate::watch::source::SourceChange;

/// Message pushed to connected clients after a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadEvent {
    /// Monotonic rebuild counter, starting at 1.
    pub version: u64,
    /// Changed files.
    pub paths: Vec<String>,
    /// True when a non-page file changed and every page was invalidated.
    pub full: bool,
}

/// Fan-out of reload events to connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadEvent>,
    version: Arc<AtomicU64>,
}

impl ReloadHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Current rebuild version (0 before the first rebuild).
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn publish(&self, paths: Vec<String>, full: bool) -> ReloadEvent {
        let event = ReloadEvent {
            version: self.version.fetch_add(1, Ordering::SeqCst) + 1,
            paths,
            full,
        };
        // No subscribers is fine: nobody has the page open.
        let _ = self.tx.send(event.clone());
        event
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Turns source changes into page invalidations and reload events.
pub struct HotReloader {
    pages: Arc<PageRegistry>,
    hub: ReloadHub,
}

impl HotReloader {
    pub fn new(pages: Arc<PageRegistry>, hub: ReloadHub) -> Self {
        Self { pages, hub }
    }

    /// Apply one batch of changed files.
    pub fn apply(&self, paths: &[PathBuf]) -> ReloadEvent {
        let mut full = false;
        for path in paths {
            if self.pages.invalidate_changed(path) == 0 {
                full = true;
            }
        }
        if full {
            self.pages.invalidate_all();
        }

        metrics::record_rebuild(full);
        let event = self.hub.publish(
            paths.iter().map(|p| p.display().to_string()).collect(),
            full,
        );
        tracing::info!(version = event.version, full = event.full, paths = ?event.paths, "Rebuilt");
        event
    }

    /// Consume source changes until the channel closes or shutdown fires.
    /// Changes already queued are coalesced into one rebuild.
    pub async fn run(
        self,
        mut changes: mpsc::UnboundedReceiver<SourceChange>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(mut batch) = change else { break };
                    while let Ok(more) = changes.try_recv() {
                        batch.extend(more);
                    }
                    batch.sort();
                    batch.dedup();
                    self.apply(&batch);
                }
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Hot reloader stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageSource;
    use std::path::Path;

    fn setup() -> (Arc<PageRegistry>, ReloadHub) {
        let mut pages = PageRegistry::new(PageSource::memory([
            ("pages/quiz/index.vue", "quiz"),
            ("pages/login/index.vue", "login"),
        ]));
        pages.component("pages/quiz/index.vue");
        pages.component("pages/login/index.vue");
        (Arc::new(pages), ReloadHub::default())
    }

    async fn load_all(pages: &PageRegistry) {
        for component in pages.components() {
            component.load().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_page_change_invalidates_only_that_page() {
        let (pages, hub) = setup();
        load_all(&pages).await;
        let mut rx = hub.subscribe();

        let reloader = HotReloader::new(pages.clone(), hub.clone());
        let event = reloader.apply(&[PathBuf::from("/app/src/pages/quiz/index.vue")]);

        assert_eq!(event.version, 1);
        assert!(!event.full);
        assert_eq!(rx.recv().await.unwrap(), event);
        assert!(!pages.get("pages/quiz/index.vue").unwrap().is_loaded());
        assert!(pages.get("pages/login/index.vue").unwrap().is_loaded());
    }

    #[tokio::test]
    async fn test_other_change_invalidates_everything() {
        let (pages, hub) = setup();
        load_all(&pages).await;

        let reloader = HotReloader::new(pages.clone(), hub.clone());
        let event = reloader.apply(&[Path::new("/app/src/components/Nav.vue").to_path_buf()]);

        assert!(event.full);
        assert!(pages.components().all(|c| !c.is_loaded()));
        assert_eq!(hub.version(), 1);
    }

    #[tokio::test]
    async fn test_run_coalesces_and_stops_on_shutdown() {
        let (pages, hub) = setup();
        let mut rx = hub.subscribe();
        let (tx, changes) = mpsc::unbounded_channel();
        let shutdown = crate::lifecycle::Shutdown::new();

        tx.send(vec![PathBuf::from("src/pages/quiz/index.vue")]).unwrap();
        tx.send(vec![PathBuf::from("src/pages/quiz/index.vue")]).unwrap();

        let task = tokio::spawn(HotReloader::new(pages, hub.clone()).run(changes, shutdown.subscribe()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.paths, vec!["src/pages/quiz/index.vue"]);

        shutdown.trigger();
        task.await.unwrap();
        assert_eq!(hub.version(), 1);
    }
}
