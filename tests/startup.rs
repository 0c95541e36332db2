//! Full startup wiring: source watcher, hot reloader and config reload,
//! driven through `lifecycle::serve` on an ephemeral port.

use std::path::Path;
use std::time::Duration;

use axum::http::StatusCode;
use careertrack_devserver::config::load_config;
use careertrack_devserver::http::HttpServer;
use careertrack_devserver::lifecycle;

mod common;

fn config_text(host: &str) -> String {
    format!(
        r#"
entry = "./main.js"
source_dir = "src"

[dev_server]
allowed_hosts = ["{host}"]

[watch_options]
poll_ms = 50
"#
    )
}

/// Wait for the next reload event mentioning `needle`.
async fn reload_mentioning(events: &mut reqwest::Response, needle: &str) -> String {
    tokio::time::timeout(Duration::from_secs(10), async {
        let mut text = String::new();
        while let Some(chunk) = events.chunk().await.unwrap() {
            text.push_str(&String::from_utf8_lossy(&chunk));
            if text.contains("event: reload") && text.contains(needle) {
                return text;
            }
        }
        text
    })
    .await
    .expect("no reload event")
}

async fn status_with_host(client: &reqwest::Client, url: &str, host: &str) -> StatusCode {
    client.get(url).header("host", host).send().await.unwrap().status()
}

#[tokio::test]
async fn test_serve_wires_watchers_and_config_reload() {
    let project = common::project();
    let root = project.path().to_path_buf();
    common::write(&root, "main.js", "console.log('v1')\n");
    let config_path = root.join("devserver.toml");
    common::write(&root, "devserver.toml", &config_text("first.test"));

    let config = load_config(&config_path).unwrap();
    let server = HttpServer::new(config, &root).unwrap();
    let shutdown = server.shutdown_handle();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = {
        let root = root.clone();
        let config_path = config_path.clone();
        tokio::spawn(async move { lifecycle::serve(server, &root, Some(&config_path), listener).await })
    };

    let client = common::client();
    let url = |path: &str| format!("http://{addr}{path}");

    // Entry outside source_dir is served and watched on its own.
    let entry = client.get(url("/main.js")).send().await.unwrap();
    assert_eq!(entry.status(), StatusCode::OK);

    let mut events = client.get(url("/__hot")).send().await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    common::write(&root, "main.js", "console.log('v2')\n");
    let received = reload_mentioning(&mut events, "main.js").await;
    assert!(received.contains("\"full\":true"), "{received}");

    common::write(&root.join("src"), "pages/quiz/index.vue", "<template><p>quiz v2</p></template>");
    reload_mentioning(&mut events, "quiz").await;
    let quiz = client.get(url("/quiz")).send().await.unwrap().text().await.unwrap();
    assert!(quiz.contains("quiz v2"), "{quiz}");

    // Config edits swap the host allow-list without a restart.
    assert_eq!(status_with_host(&client, &url("/quiz"), "first.test").await, StatusCode::OK);
    assert_eq!(status_with_host(&client, &url("/quiz"), "second.test").await, StatusCode::FORBIDDEN);

    common::write(&root, "devserver.toml", &config_text("second.test"));
    tokio::time::timeout(Duration::from_secs(10), async {
        while status_with_host(&client, &url("/quiz"), "second.test").await != StatusCode::OK {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("allowed hosts not reloaded");
    assert_eq!(status_with_host(&client, &url("/quiz"), "first.test").await, StatusCode::FORBIDDEN);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(10), serving)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_serve_without_watching() {
    let project = common::project();
    let mut config = careertrack_devserver::config::DevConfig::default();
    config.watch = false;
    config.dev_server.hot = false;

    let server = HttpServer::new(config, project.path()).unwrap();
    let shutdown = server.shutdown_handle();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let root = project.path().to_path_buf();
    let serving = tokio::spawn(async move { lifecycle::serve(server, Path::new(&root), None, listener).await });

    let res = common::client()
        .get(format!("http://{addr}/settings"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
    assert!(serving.await.unwrap().is_ok());
}
