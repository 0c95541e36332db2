//! Route lookup and resolution.
//!
//! # Responsibilities
//! - Compile route declarations into an ordered table
//! - Look up the first matching route for a path
//! - Follow redirects to the page that finally renders
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Wildcard routes are moved behind every other route at build time
//! - O(n) scan in declaration order (route counts are small)
//! - Redirect chains are bounded; cycles are rejected at build time

use thiserror::Error;

use crate::pages::{ComponentRef, PageRegistry};
use crate::routing::matcher::{Params, PathPattern, PatternError};
use crate::routing::route::{RouteDef, RouteEntry, RouteTarget};

/// Maximum number of redirects followed by a single resolution.
pub const MAX_REDIRECTS: usize = 10;

/// Error raised while compiling route declarations.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route '{path}': invalid pattern: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: PatternError,
    },
    #[error("route '{path}' declares neither a component nor a redirect")]
    MissingTarget { path: String },
    #[error("route '{path}' declares both a component and a redirect")]
    ConflictingTarget { path: String },
    #[error("route '{path}': redirect target '{target}' must be an absolute path")]
    InvalidRedirect { path: String, target: String },
    #[error("route '{path}': redirect target '{target}' does not resolve: {source}")]
    DanglingRedirect {
        path: String,
        target: String,
        #[source]
        source: RoutingError,
    },
}

/// Error raised while resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("no route matches '{path}'")]
    NotFound { path: String },
    #[error("redirect loop while resolving '{path}' ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },
}

/// The first route that structurally matches a path.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: Params,
}

/// Outcome of resolving a path down to a page.
#[derive(Debug)]
pub struct Resolution<'a> {
    /// Path originally requested.
    pub requested: String,
    /// Path of the page that renders (after redirects).
    pub path: String,
    /// Route that renders.
    pub entry: &'a RouteEntry,
    /// Page view of that route.
    pub component: &'a ComponentRef,
    /// Params captured by the rendering route.
    pub params: Params,
    /// Redirect targets followed, in order.
    pub redirects: Vec<String>,
}

impl Resolution<'_> {
    pub fn is_redirect(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Immutable, ordered route table.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile route declarations. Page modules are registered in `pages`
    /// so that routes naming the same module share one component.
    pub fn from_defs(defs: &[RouteDef], pages: &mut PageRegistry) -> Result<Self, RouteError> {
        let mut routes = Vec::with_capacity(defs.len());

        for def in defs {
            let pattern = PathPattern::parse(&def.path).map_err(|source| RouteError::InvalidPattern {
                path: def.path.clone(),
                source,
            })?;

            let target = match (&def.component, &def.redirect) {
                (Some(module), None) => RouteTarget::Component(pages.component(module)),
                (None, Some(target)) => {
                    if !target.starts_with('/') {
                        return Err(RouteError::InvalidRedirect {
                            path: def.path.clone(),
                            target: target.clone(),
                        });
                    }
                    RouteTarget::Redirect(target.clone())
                }
                (None, None) => return Err(RouteError::MissingTarget { path: def.path.clone() }),
                (Some(_), Some(_)) => {
                    return Err(RouteError::ConflictingTarget { path: def.path.clone() })
                }
            };

            routes.push(RouteEntry {
                pattern,
                name: def.name.clone(),
                target,
                meta: def.meta.clone(),
            });
        }

        // Stable: keeps declaration order within each group.
        routes.sort_by_key(|route| route.pattern.is_wildcard());

        let table = Self { routes };
        table.check_redirects()?;

        tracing::debug!(routes = table.routes.len(), "Route table compiled");
        Ok(table)
    }

    fn check_redirects(&self) -> Result<(), RouteError> {
        for route in &self.routes {
            if let RouteTarget::Redirect(target) = &route.target {
                self.resolve(target).map_err(|source| RouteError::DanglingRedirect {
                    path: route.path().to_string(),
                    target: target.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Return the first route whose pattern matches `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|entry| {
            entry
                .pattern
                .matches(path)
                .map(|params| RouteMatch { entry, params })
        })
    }

    /// Resolve `path` to the page that renders it, following redirects.
    pub fn resolve(&self, path: &str) -> Result<Resolution<'_>, RoutingError> {
        let mut current = path.to_string();
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let matched = self
                .match_path(&current)
                .ok_or_else(|| RoutingError::NotFound { path: current.clone() })?;

            match &matched.entry.target {
                RouteTarget::Component(component) => {
                    return Ok(Resolution {
                        requested: path.to_string(),
                        path: current,
                        entry: matched.entry,
                        component,
                        params: matched.params,
                        redirects,
                    });
                }
                RouteTarget::Redirect(target) => {
                    redirects.push(target.clone());
                    current = target.clone();
                }
            }
        }

        Err(RoutingError::RedirectLoop {
            path: path.to_string(),
            hops: MAX_REDIRECTS,
        })
    }

    /// Routes in evaluation order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageSource;
    use std::sync::Arc;

    fn build(defs: &[RouteDef]) -> Result<RouteTable, RouteError> {
        let mut pages = PageRegistry::new(PageSource::memory::<_, String, String>([]));
        RouteTable::from_defs(defs, &mut pages)
    }

    #[test]
    fn test_first_match_wins() {
        let table = build(&[
            RouteDef::page("/quiz/:id", "Quiz Detail", "pages/quiz/detail.vue"),
            RouteDef::page("/quiz/new", "New Quiz", "pages/quiz/new.vue"),
        ])
        .unwrap();

        let matched = table.match_path("/quiz/new").unwrap();
        assert_eq!(matched.entry.name(), Some("Quiz Detail"));
        assert_eq!(matched.params.get("id").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_wildcard_moved_last() {
        let table = build(&[
            RouteDef::redirect("/:pathMatch(.*)*", "/404"),
            RouteDef::page("/404", "404", "pages/error404/index.vue"),
            RouteDef::page("/quiz", "Quiz", "pages/quiz/index.vue"),
        ])
        .unwrap();

        assert_eq!(table.routes().last().unwrap().path(), "/:pathMatch(.*)*");
        assert_eq!(table.match_path("/quiz").unwrap().entry.name(), Some("Quiz"));

        let resolution = table.resolve("/anything/else").unwrap();
        assert_eq!(resolution.entry.name(), Some("404"));
        assert_eq!(resolution.redirects, vec!["/404".to_string()]);
    }

    #[test]
    fn test_shared_component() {
        let table = build(&[
            RouteDef::page("/", "Textbook", "pages/textbook/index.vue"),
            RouteDef::page("/textbook", "Textbook", "pages/textbook/index.vue"),
        ])
        .unwrap();

        let a = table.resolve("/").unwrap();
        let b = table.resolve("/textbook").unwrap();
        assert!(Arc::ptr_eq(a.component, b.component));
    }

    #[test]
    fn test_not_found_without_wildcard() {
        let table = build(&[RouteDef::page("/quiz", "Quiz", "pages/quiz/index.vue")]).unwrap();

        assert_eq!(
            table.resolve("/nope").unwrap_err(),
            RoutingError::NotFound { path: "/nope".into() }
        );
    }

    #[test]
    fn test_redirect_chain() {
        let table = build(&[
            RouteDef::redirect("/home", "/textbook"),
            RouteDef::redirect("/start", "/home"),
            RouteDef::page("/textbook", "Textbook", "pages/textbook/index.vue"),
        ])
        .unwrap();

        let resolution = table.resolve("/start").unwrap();
        assert_eq!(resolution.requested, "/start");
        assert_eq!(resolution.path, "/textbook");
        assert_eq!(resolution.redirects, vec!["/home", "/textbook"]);
        assert!(resolution.is_redirect());
    }

    #[test]
    fn test_invalid_declarations() {
        let neither = RouteDef {
            component: None,
            ..RouteDef::page("/a", "A", "a.vue")
        };
        assert!(matches!(build(&[neither]), Err(RouteError::MissingTarget { .. })));

        let both = RouteDef {
            redirect: Some("/b".into()),
            ..RouteDef::page("/a", "A", "a.vue")
        };
        assert!(matches!(build(&[both]), Err(RouteError::ConflictingTarget { .. })));

        assert!(matches!(
            build(&[RouteDef::redirect("/a", "b")]),
            Err(RouteError::InvalidRedirect { .. })
        ));
        assert!(matches!(
            build(&[RouteDef::page("a", "A", "a.vue")]),
            Err(RouteError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_redirect_cycles_rejected() {
        let result = build(&[
            RouteDef::redirect("/a", "/b"),
            RouteDef::redirect("/b", "/a"),
        ]);
        assert!(matches!(
            result,
            Err(RouteError::DanglingRedirect {
                source: RoutingError::RedirectLoop { .. },
                ..
            })
        ));

        // Wildcard redirecting to a path nothing else serves loops onto itself.
        let result = build(&[RouteDef::redirect("/:pathMatch(.*)*", "/404")]);
        assert!(matches!(result, Err(RouteError::DanglingRedirect { .. })));
    }
}
