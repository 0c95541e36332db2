//! Route declarations and compiled route entries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pages::ComponentRef;
use crate::routing::matcher::PathPattern;

/// Auxiliary per-route values handed to the page view (e.g. `isLogin`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RouteMeta(BTreeMap<String, Value>);

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Boolean flag lookup; `None` when absent or not a boolean.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// A route as declared in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteDef {
    /// Path pattern.
    pub path: String,

    /// Display name; not required to be unique.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Page module, relative to the source directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Path to navigate to instead of rendering a page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    #[serde(default, skip_serializing_if = "RouteMeta::is_empty")]
    pub meta: RouteMeta,
}

impl RouteDef {
    /// Declare a page route.
    pub fn page(path: &str, name: &str, component: &str) -> Self {
        Self {
            path: path.to_string(),
            name: Some(name.to_string()),
            component: Some(component.to_string()),
            redirect: None,
            meta: RouteMeta::new(),
        }
    }

    /// Declare a redirect route.
    pub fn redirect(path: &str, target: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            component: None,
            redirect: Some(target.to_string()),
            meta: RouteMeta::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key, value);
        self
    }
}

/// What a matched route leads to.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// Lazily loaded page view.
    Component(ComponentRef),
    /// Path to navigate to instead.
    Redirect(String),
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub(crate) pattern: PathPattern,
    pub(crate) name: Option<String>,
    pub(crate) target: RouteTarget,
    pub(crate) meta: RouteMeta,
}

impl RouteEntry {
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    pub fn component(&self) -> Option<&ComponentRef> {
        match &self.target {
            RouteTarget::Component(component) => Some(component),
            RouteTarget::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Component(_) => None,
            RouteTarget::Redirect(target) => Some(target),
        }
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(name) = &self.name {
            write!(f, " [{}]", name)?;
        }
        match &self.target {
            RouteTarget::Component(component) => write!(f, " -> {}", component.module())?,
            RouteTarget::Redirect(target) => write!(f, " => {}", target)?,
        }
        for (key, value) in self.meta.iter() {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}
