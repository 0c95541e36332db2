//! Page components subsystem.
//!
//! # Data Flow
//! ```text
//! Route compilation:
//!     RouteDef.component (module path)
//!     → PageRegistry::component (one handle per module)
//!     → RouteEntry holds ComponentRef
//!
//! Navigation:
//!     ComponentRef::load (first activation reads source.rs)
//!     → view.rs (template extraction, placeholder rendering)
//!
//! Hot reload:
//!     changed file → PageRegistry::invalidate_changed → next load re-reads
//! ```
//!
//! # Design Decisions
//! - No page is read at startup
//! - A module is read at most once until a change invalidates it
//! - The registry is built before the route table and frozen with it

pub mod lazy;
pub mod source;
pub mod view;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub use lazy::{ComponentRef, LazyComponent};
pub use source::{PageError, PageSource};
pub use view::{escape_html, PageView, RenderContext};

/// Page components keyed by module path.
#[derive(Debug)]
pub struct PageRegistry {
    source: Arc<PageSource>,
    components: BTreeMap<String, ComponentRef>,
}

impl PageRegistry {
    pub fn new(source: PageSource) -> Self {
        Self {
            source: Arc::new(source),
            components: BTreeMap::new(),
        }
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    /// Handle for `module`, created on first request.
    pub fn component(&mut self, module: &str) -> ComponentRef {
        let source = &self.source;
        self.components
            .entry(module.to_string())
            .or_insert_with(|| Arc::new(LazyComponent::new(module, Arc::clone(source))))
            .clone()
    }

    pub fn get(&self, module: &str) -> Option<&ComponentRef> {
        self.components.get(module)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Invalidate the components backed by `changed`. Returns how many were
    /// invalidated; zero means the file is not a page module.
    pub fn invalidate_changed(&self, changed: &Path) -> usize {
        let mut count = 0;
        for component in self.components.values() {
            let module = Path::new(component.module().trim_start_matches("./"));
            if changed.ends_with(module) {
                component.invalidate();
                count += 1;
            }
        }
        count
    }

    /// Invalidate every component.
    pub fn invalidate_all(&self) -> usize {
        for component in self.components.values() {
            component.invalidate();
        }
        self.components.len()
    }
}
