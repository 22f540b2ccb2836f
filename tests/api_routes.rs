//! End-to-end tests for the HTTP API.
//!
//! Each test binds the real router to an ephemeral port and talks to it with
//! reqwest. Nothing here touches public DNS or launches a browser.

use std::net::SocketAddr;

use domain_check::{build_router, AppState, Config, TraceStrategy};
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::{json, Value};

async fn spawn_app(config: Config) -> SocketAddr {
    let state = AppState::new(config).expect("state should build");
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    addr
}

fn test_config() -> Config {
    Config {
        redirect_strategy: TraceStrategy::HttpClient,
        request_timeout_ms: 5_000,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_health_reports_ok() {
    let addr = spawn_app(test_config()).await;
    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_domain_check_without_domain_is_400() {
    let addr = spawn_app(test_config()).await;
    let client = reqwest::Client::new();

    for payload in [json!({}), json!({ "domain": "" }), json!({ "domain": "   " })] {
        let response = client
            .post(format!("http://{addr}/api/domain-check"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "payload {payload}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "No domain provided" }));
    }
}

#[tokio::test]
async fn test_domain_check_with_malformed_body_is_400() {
    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/domain-check"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No domain provided");
}

#[tokio::test]
async fn test_redirect_without_url_is_400() {
    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({ "device": "ios" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No URL provided" }));
}

#[tokio::test]
async fn test_redirect_with_bad_optional_field_names_it() {
    let addr = spawn_app(test_config()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({ "url": "https://example.com", "strategy": "bogus" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Invalid strategy"), "{error}");

    let response = client
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({ "url": "https://example.com", "device": { "name": "ios" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid device"));
}

#[tokio::test]
async fn test_redirect_http_client_returns_final_hop_under_redirects_key() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/go"))
            .respond_with(status_code(302).insert_header("Location", "/landing")),
    );
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/landing"))
            .respond_with(status_code(200).body("hello")),
    );

    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({ "url": upstream.url("/go").to_string() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body.get("chain").is_none());
    assert_eq!(
        body["redirects"],
        json!([{ "url": upstream.url("/landing").to_string(), "statusCode": 200 }])
    );
}

#[tokio::test]
async fn test_redirect_http_client_failure_is_500() {
    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({ "url": "http://127.0.0.1:9/unreachable" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_redirect_strategy_can_be_chosen_per_request() {
    let upstream = Server::run();
    upstream.expect(
        Expectation::matching(request::method_path("GET", "/direct"))
            .respond_with(status_code(204)),
    );

    // Default is the browser; the request asks for the HTTP client
    let config = Config {
        redirect_strategy: TraceStrategy::ScriptedBrowser,
        ..test_config()
    };
    let addr = spawn_app(config).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/redirect"))
        .json(&json!({
            "url": upstream.url("/direct").to_string(),
            "strategy": "http-client",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirects"][0]["statusCode"], 204);
}

#[tokio::test]
async fn test_raw_dns_endpoints_require_domain() {
    let addr = spawn_app(test_config()).await;
    for path in ["/api/cname", "/api/caa", "/api/cname?domain=", "/api/caa?domain=%20"] {
        let response = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
        assert_eq!(response.status(), 400, "path {path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "No domain provided");
    }
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .header("Origin", "https://elsewhere.test")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_unknown_paths_fall_back_to_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>checker</h1>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();

    let config = Config {
        static_dir: dir.path().to_path_buf(),
        ..test_config()
    };
    let addr = spawn_app(config).await;

    let index = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(index.status(), 200);
    assert_eq!(index.text().await.unwrap(), "<h1>checker</h1>");

    let script = reqwest::get(format!("http://{addr}/app.js")).await.unwrap();
    assert_eq!(script.status(), 200);
    assert!(script.text().await.unwrap().contains("console.log"));

    let missing = reqwest::get(format!("http://{addr}/nope.css")).await.unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_domain_check_live_domain() {
    let addr = spawn_app(test_config()).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/domain-check"))
        .json(&json!({ "domain": "example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["domain"], "example.com");
    assert!(body.get("cnameValid").is_some());
    assert!(body.get("clickHandler").is_some());
}
