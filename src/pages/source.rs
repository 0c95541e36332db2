//! Where page modules are read from.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Error type for page loading.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("page module '{0}' not found")]
    NotFound(String),
    #[error("page module '{0}' escapes the source directory")]
    InvalidModule(String),
    #[error("failed to read page module '{module}': {source}")]
    Io {
        module: String,
        #[source]
        source: io::Error,
    },
}

/// Backing store for page modules.
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Modules are files under `root`.
    Filesystem { root: PathBuf },
    /// Modules are held in memory, keyed by module path.
    Memory(HashMap<String, String>),
}

impl PageSource {
    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::Filesystem { root: root.into() }
    }

    pub fn memory<I, K, V>(modules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Memory(
            modules
                .into_iter()
                .map(|(k, v)| {
                    let module: String = k.into();
                    (normalize_module(&module).to_string(), v.into())
                })
                .collect(),
        )
    }

    /// File backing `module`, for filesystem sources.
    pub fn module_path(&self, module: &str) -> Option<PathBuf> {
        match self {
            Self::Filesystem { root } => Some(root.join(normalize_module(module))),
            Self::Memory(_) => None,
        }
    }

    /// Read the raw text of a page module.
    pub async fn read(&self, module: &str) -> Result<String, PageError> {
        let normalized = normalize_module(module);
        if escapes_root(Path::new(normalized)) {
            return Err(PageError::InvalidModule(module.to_string()));
        }

        match self {
            Self::Filesystem { root } => {
                let path = root.join(normalized);
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        PageError::NotFound(module.to_string())
                    } else {
                        PageError::Io {
                            module: module.to_string(),
                            source: e,
                        }
                    }
                })
            }
            Self::Memory(modules) => modules
                .get(normalized)
                .cloned()
                .ok_or_else(|| PageError::NotFound(module.to_string())),
        }
    }
}

fn normalize_module(module: &str) -> &str {
    module.trim_start_matches("./").trim_start_matches('/')
}

fn escapes_root(path: &Path) -> bool {
    path.components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
}
