//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use careertrack_devserver::config::DevConfig;
use careertrack_devserver::http::{AppState, HttpServer};
use careertrack_devserver::lifecycle::Shutdown;
use tempfile::TempDir;

pub const PAGES: [(&str, &str); 9] = [
    (
        "pages/login/index.vue",
        "<template>\n  <form data-mode=\"{{ meta.isLogin }}\">{{ route.name }}</form>\n</template>\n<script>\nexport default {}\n</script>\n",
    ),
    ("pages/profile/index.vue", "<template><p>profile</p></template>"),
    ("pages/settings/index.vue", "<template><p>settings</p></template>"),
    ("pages/debug/index.vue", "<template><p>debug</p></template>"),
    ("pages/textbook/index.vue", "<template><p>textbook</p></template>"),
    ("pages/quiz/index.vue", "<template><p>quiz v1</p></template>"),
    ("pages/activity/index.vue", "<template><p>activity</p></template>"),
    ("pages/google_redirect/index.vue", "<template><p>google</p></template>"),
    ("pages/error404/index.vue", "<template><p>page not found</p></template>"),
];

/// Create a project tree with an entry module and every page.
pub fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/main.js", "import App from './App.vue'\n");
    for (module, text) in PAGES {
        write(&dir.path().join("src"), module, text);
    }
    dir
}

pub fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

/// A dev server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a dev server for the project at `root`.
pub async fn start_server(config: DevConfig, root: &Path) -> TestServer {
    let server = HttpServer::new(config, root).unwrap();
    let state = server.state().clone();
    let shutdown = server.shutdown_handle();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    TestServer {
        addr,
        state,
        shutdown,
    }
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .no_proxy()
        .build()
        .unwrap()
}
