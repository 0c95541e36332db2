//! HTML shell around rendered pages.

use std::path::PathBuf;

use crate::pages::{escape_html, PageView, RenderContext};
use crate::routing::Resolution;

/// Path of the hot reload event stream.
pub const HOT_PATH: &str = "/__hot";

const DEFAULT_TITLE: &str = "CareerTrack";

/// Settings that shape every served page.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// URL the entry module is served at.
    pub entry_url: String,
    /// File the entry module is read from.
    pub entry_file: PathBuf,
    /// Inject the hot reload client.
    pub hot: bool,
}

impl ShellOptions {
    pub fn new(entry: &str, root: &std::path::Path, hot: bool) -> Self {
        Self {
            entry_url: entry_url(entry),
            entry_file: root.join(entry_relative(entry)),
            hot,
        }
    }
}

/// URL the entry module is served at, e.g. `./src/main.js` → `/src/main.js`.
pub fn entry_url(entry: &str) -> String {
    format!("/{}", entry_relative(entry))
}

fn entry_relative(entry: &str) -> &str {
    entry.trim_start_matches("./").trim_start_matches('/')
}

/// Render a resolved page into a full HTML document.
pub fn render_page(options: &ShellOptions, resolution: &Resolution<'_>, view: &PageView) -> String {
    let entry = resolution.entry;
    let body = view.render(&RenderContext {
        route_name: entry.name(),
        path: &resolution.path,
        meta: entry.meta(),
        params: &resolution.params,
    });
    let meta_json = serde_json::to_string(entry.meta()).unwrap_or_else(|_| "{}".to_string());
    let title = escape_html(entry.name().unwrap_or(DEFAULT_TITLE));

    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!(
        "<div id=\"app\" data-route=\"{}\" data-path=\"{}\" data-meta=\"{}\">\n{}\n</div>\n",
        title,
        escape_html(&resolution.path),
        escape_html(&meta_json),
        body
    ));
    html.push_str(&format!(
        "<script type=\"module\" src=\"{}\"></script>\n",
        escape_html(&options.entry_url)
    ));
    if options.hot {
        html.push_str(&format!(
            "<script>new EventSource(\"{HOT_PATH}\").addEventListener(\"reload\", () => location.reload());</script>\n"
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{PageRegistry, PageSource};
    use crate::routing::{app_routes, RouteTable};
    use std::path::Path;

    fn table() -> RouteTable {
        let mut pages = PageRegistry::new(PageSource::memory::<_, String, String>([]));
        RouteTable::from_defs(&app_routes(), &mut pages).unwrap()
    }

    #[test]
    fn test_entry_url() {
        let options = ShellOptions::new("./src/main.js", Path::new("/app"), true);
        assert_eq!(options.entry_url, "/src/main.js");
        assert_eq!(options.entry_file, Path::new("/app/src/main.js"));

        assert_eq!(entry_url("/src/main.js"), "/src/main.js");
        assert_eq!(entry_url("./"), "/");
    }

    #[test]
    fn test_shell_carries_route_meta() {
        let table = table();
        let resolution = table.resolve("/login").unwrap();
        let view = PageView::parse("pages/login/index.vue", "<form></form>");
        let options = ShellOptions::new("./src/main.js", Path::new("."), false);

        let html = render_page(&options, &resolution, &view);
        assert!(html.contains("<title>Login Page</title>"));
        assert!(html.contains(r#"data-meta="{&quot;isLogin&quot;:true}""#));
        assert!(html.contains(r#"<script type="module" src="/src/main.js"></script>"#));
        assert!(!html.contains(HOT_PATH));
    }

    #[test]
    fn test_hot_client_injected() {
        let table = table();
        let resolution = table.resolve("/quiz").unwrap();
        let view = PageView::parse("pages/quiz/index.vue", "<p>quiz</p>");
        let options = ShellOptions::new("./src/main.js", Path::new("."), true);

        let html = render_page(&options, &resolution, &view);
        assert!(html.contains("new EventSource(\"/__hot\")"));
        assert!(html.contains(r#"data-meta="{}""#));
    }
}
