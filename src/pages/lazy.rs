//! Lazily loaded page components.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use tokio::sync::OnceCell;

use crate::observability::metrics;
use crate::pages::source::{PageError, PageSource};
use crate::pages::view::PageView;

/// Shared handle to a page component. Routes naming the same module hold
/// the same handle.
pub type ComponentRef = Arc<LazyComponent>;

/// A page view that is read and parsed on first activation, then reused.
///
/// Concurrent first activations share a single load. `invalidate` swaps in
/// an empty cell so the next activation reads the module again.
pub struct LazyComponent {
    module: String,
    source: Arc<PageSource>,
    cell: ArcSwap<OnceCell<Arc<PageView>>>,
    loads: AtomicU64,
}

impl LazyComponent {
    pub fn new(module: impl Into<String>, source: Arc<PageSource>) -> Self {
        Self {
            module: module.into(),
            source,
            cell: ArcSwap::from_pointee(OnceCell::new()),
            loads: AtomicU64::new(0),
        }
    }

    /// Module path, relative to the source directory.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Return the view, loading it if this is the first activation.
    pub async fn load(&self) -> Result<Arc<PageView>, PageError> {
        let cell = self.cell.load_full();
        let view = cell
            .get_or_try_init(|| async {
                let start = Instant::now();
                let text = self.source.read(&self.module).await?;
                self.loads.fetch_add(1, Ordering::Relaxed);
                metrics::record_page_load(&self.module, start);
                tracing::debug!(module = %self.module, "Page component loaded");
                Ok::<_, PageError>(Arc::new(PageView::parse(&self.module, &text)))
            })
            .await?;
        Ok(Arc::clone(view))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.load().initialized()
    }

    /// Drop the memoized view.
    pub fn invalidate(&self) {
        self.cell.store(Arc::new(OnceCell::new()));
    }

    /// Number of times the module has been read.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for LazyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyComponent")
            .field("module", &self.module)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
