//! End-to-end tests for the HTTP API.
//!
//! Each test starts the server on a free port, backed by the in-memory store
//! and a fixture search provider, and drives it with `reqwest`.

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

use snipai::config::Config;
use snipai::server::run_server;

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

fn test_config(tmp: &TempDir, port: u16, provider: &str) -> Config {
    let fixture = tmp.path().join("results.json");
    fs::write(
        &fixture,
        json!({
            "items": [
                {
                    "title": "Python list comprehension with condition",
                    "link": "https://stackoverflow.com/questions/4260280",
                    "snippet": "Filter a list with a comprehension and a function"
                },
                { "title": "missing link" },
                {
                    "title": "Squares of even numbers",
                    "link": "https://www.github.com/acme/squares",
                    "snippet": "list of squares"
                }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let config_content = format!(
        r#"[server]
bind = "127.0.0.1:{}"

[annotate]
seed = 42

[search]
provider = "{}"
fixture_path = "{}"
"#,
        port,
        provider,
        fixture.display()
    );
    toml::from_str(&config_content).unwrap()
}

struct TestServer {
    base: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
    _tmp: TempDir,
}

impl TestServer {
    async fn start(provider: &str) -> Self {
        let port = find_free_port();
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(&tmp, port, provider);

        let handle = tokio::spawn(async move {
            run_server(&cfg).await.ok();
        });
        wait_for_server(port).await;

        Self {
            base: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            handle,
            _tmp: tmp,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn test_banner_and_health() {
    let server = TestServer::start("fixture").await;

    let resp = server.client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "SnipAI API is running...");

    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_seeds_samples() {
    let server = TestServer::start("fixture").await;

    let resp = server
        .client
        .get(server.url("/api/snippets"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let snippets = body.as_array().unwrap();
    assert_eq!(snippets.len(), 2);
    assert_eq!(snippets[0]["_id"], "1");
    assert_eq!(snippets[0]["aiTags"], json!(["function", "react", "hook"]));
    assert_eq!(snippets[1]["_id"], "2");
    assert_eq!(snippets[1]["language"], "python");
    assert!(snippets[1]["createdAt"].is_string());
}

#[tokio::test]
async fn test_snippet_crud() {
    let server = TestServer::start("fixture").await;
    let client = &server.client;

    // Create
    let resp = client
        .post(server.url("/api/snippets"))
        .json(&json!({
            "title": "Fetch users",
            "code": "async function load() { const r = await fetch('/users'); return r.json(); }",
            "language": "javascript",
            "tags": ["http"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["description"], "");
    assert_eq!(created["tags"], json!(["http"]));
    let ai_tags = created["aiTags"].as_array().unwrap();
    assert!((2..=3).contains(&ai_tags.len()));
    assert!(created["explanation"]
        .as_str()
        .unwrap()
        .starts_with("Manages asynchronous operations using modern async/await syntax."));

    // Newest first
    let list: Value = client
        .get(server.url("/api/snippets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list[0]["_id"], id.as_str());

    // Get
    let resp = client
        .get(server.url(&format!("/api/snippets/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Patch: present fields overwrite, unknown keys are ignored
    let resp = client
        .patch(server.url(&format!("/api/snippets/{}", id)))
        .json(&json!({"title": "Load users", "tags": [], "bogus": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let patched: Value = resp.json().await.unwrap();
    assert_eq!(patched["title"], "Load users");
    assert_eq!(patched["tags"], json!([]));
    assert_eq!(patched["language"], "javascript");
    assert!(patched.get("bogus").is_none());

    // Delete
    let resp = client
        .delete(server.url(&format!("/api/snippets/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Snippet deleted successfully");

    // Gone
    let resp = client
        .get(server.url(&format!("/api/snippets/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_create_validation() {
    let server = TestServer::start("fixture").await;

    let resp = server
        .client
        .post(server.url("/api/snippets"))
        .json(&json!({"title": "No code", "language": "python"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(
        body["error"]["message"],
        "Please provide title, code, and language"
    );
}

#[tokio::test]
async fn test_missing_ids_are_404() {
    let server = TestServer::start("fixture").await;
    let client = &server.client;

    for resp in [
        client.get(server.url("/api/snippets/nope")).send().await.unwrap(),
        client
            .get(server.url("/api/snippets/nope/similar"))
            .send()
            .await
            .unwrap(),
        client
            .patch(server.url("/api/snippets/nope"))
            .json(&json!({"title": "x"}))
            .send()
            .await
            .unwrap(),
        client
            .delete(server.url("/api/snippets/nope"))
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(resp.status(), 404);
    }
}

#[tokio::test]
async fn test_similar_local_and_online() {
    let server = TestServer::start("fixture").await;
    let client = &server.client;

    // Seed, then add a close match for sample "2".
    client.get(server.url("/api/snippets")).send().await.unwrap();
    let created: Value = client
        .post(server.url("/api/snippets"))
        .json(&json!({
            "title": "Evens",
            "code": "evens = [n for n in range(20) if n % 2 == 0]",
            "language": "python",
            "tags": ["list", "comprehension"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let local: Value = client
        .get(server.url("/api/snippets/2/similar"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let local = local.as_array().unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0]["_id"], created["_id"]);
    assert!(local[0]["similarityScore"].as_u64().unwrap() >= 60);
    assert!(local[0].get("fromWeb").is_none());

    // Anything but the literal "true" stays local.
    let not_online: Value = client
        .get(server.url("/api/snippets/2/similar?searchOnline=yes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(not_online.as_array().unwrap().len(), 1);

    let online: Value = client
        .get(server.url("/api/snippets/2/similar?searchOnline=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let online = online.as_array().unwrap();
    assert_eq!(online.len(), 3);

    let web: Vec<&Value> = online.iter().filter(|c| c["fromWeb"] == true).collect();
    let web_ids: Vec<&str> = web.iter().map(|c| c["_id"].as_str().unwrap()).collect();
    assert!(web_ids.contains(&"web_0"));
    assert!(web_ids.contains(&"web_2"));
    for candidate in &web {
        assert_eq!(candidate["language"], "python");
        assert!(candidate["source"]["url"].is_string());
        let score = candidate["similarityScore"].as_u64().unwrap();
        assert!((30..=95).contains(&score));
    }
    let names: Vec<&str> = web
        .iter()
        .map(|c| c["source"]["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"stackoverflow.com"));
    assert!(names.contains(&"github.com"));

    let scores: Vec<u64> = online
        .iter()
        .map(|c| c["similarityScore"].as_u64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "unsorted: {:?}", scores);
}

#[tokio::test]
async fn test_similar_online_falls_back_when_search_disabled() {
    let server = TestServer::start("disabled").await;
    let client = &server.client;

    client.get(server.url("/api/snippets")).send().await.unwrap();
    let local: Value = client
        .get(server.url("/api/snippets/1/similar"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let online = client
        .get(server.url("/api/snippets/1/similar?searchOnline=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(online.status(), 200);
    let online: Value = online.json().await.unwrap();
    assert_eq!(online, local);
}
