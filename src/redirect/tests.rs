//! Redirect tracer tests.

use std::time::Duration;

use super::browser::{
    document_hop, order_by_observation, settle_wait, user_agent_override, NavigationOutcome,
};
use super::*;
use crate::config::Config;
use crate::models::DeviceProfile;
use chromiumoxide::cdp::browser_protocol::network::ResourceType;
use chromiumoxide::cdp::browser_protocol::page::FrameId;
use httptest::{matchers::*, responders::*, Expectation, Server};

fn http_trace_config(url: &str) -> TraceConfiguration {
    let mut config = TraceConfiguration::from_config(
        &Config::default(),
        url,
        TraceStrategy::HttpClient,
        DeviceProfile::Desktop,
    );
    config.request_timeout_ms = 5_000;
    config
}

fn redirect_to(location: &str) -> impl httptest::responders::Responder {
    status_code(302).insert_header("Location", location.to_string())
}

#[test]
fn test_dedupe_hops_keeps_first_occurrence_in_order() {
    let hops = vec![
        RedirectHop::new("https://a.test/", 302),
        RedirectHop::new("https://b.test/", 301),
        RedirectHop::new("https://a.test/", 200),
        RedirectHop::new("https://c.test/", 200),
        RedirectHop::new("https://b.test/", 200),
    ];
    let deduped = dedupe_hops(hops);
    assert_eq!(
        deduped,
        vec![
            RedirectHop::new("https://a.test/", 302),
            RedirectHop::new("https://b.test/", 301),
            RedirectHop::new("https://c.test/", 200),
        ]
    );
}

#[test]
fn test_dedupe_hops_empty() {
    assert!(dedupe_hops(Vec::new()).is_empty());
}

#[test]
fn test_validate_start_url() {
    assert!(validate_start_url("https://example.com/path?q=1").is_ok());
    assert!(validate_start_url("  http://example.com  ").is_ok());
    assert!(matches!(
        validate_start_url("example.com"),
        Err(TraceError::InvalidUrl { .. })
    ));
    assert!(matches!(
        validate_start_url("ftp://example.com/file"),
        Err(TraceError::InvalidUrl { .. })
    ));
    assert!(matches!(
        validate_start_url("mailto:someone@example.com"),
        Err(TraceError::InvalidUrl { .. })
    ));
}

#[test]
fn test_tracer_strategies() {
    assert_eq!(HttpClientTracer.strategy(), TraceStrategy::HttpClient);
    assert_eq!(
        BrowserTracer::new(None).strategy(),
        TraceStrategy::ScriptedBrowser
    );
}

#[test]
fn test_user_agent_override_uses_device_profile() {
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;

    let params: SetUserAgentOverrideParams = user_agent_override(DeviceProfile::Ios);
    assert_eq!(params.user_agent, DeviceProfile::Ios.user_agent());
    assert!(params.user_agent.contains("iPhone"));
    assert_eq!(
        user_agent_override(DeviceProfile::Desktop).user_agent,
        DeviceProfile::Desktop.user_agent()
    );
}

#[test]
fn test_settle_wait_only_after_loaded_document() {
    let settle = Duration::from_millis(5_000);
    assert_eq!(settle_wait(NavigationOutcome::Loaded, settle), Some(settle));
    // A failed navigation (DNS error, errorText) must not add the settle delay
    assert_eq!(settle_wait(NavigationOutcome::Failed, settle), None);
    assert_eq!(settle_wait(NavigationOutcome::TimedOut, settle), None);
}

#[test]
fn test_document_hop_filters() {
    let main = FrameId::new("MAIN");
    let child = FrameId::new("CHILD");

    // Top-level HTTPS document
    assert_eq!(
        document_hop(
            Some(&ResourceType::Document),
            Some(&main),
            &main,
            "https://final.test/",
            200
        ),
        Some(RedirectHop::new("https://final.test/", 200))
    );
    // Missing frame id counts as top-level
    assert!(document_hop(
        Some(&ResourceType::Document),
        None,
        &main,
        "https://final.test/",
        302
    )
    .is_some());
    // Iframe document
    assert!(document_hop(
        Some(&ResourceType::Document),
        Some(&child),
        &main,
        "https://ads.test/",
        200
    )
    .is_none());
    // Subresource
    assert!(document_hop(
        Some(&ResourceType::Script),
        Some(&main),
        &main,
        "https://cdn.test/app.js",
        200
    )
    .is_none());
    // Plain HTTP is not recorded
    assert!(document_hop(
        Some(&ResourceType::Document),
        Some(&main),
        &main,
        "http://start.test/",
        302
    )
    .is_none());
    // Unknown resource type
    assert!(document_hop(None, Some(&main), &main, "https://final.test/", 200).is_none());
}

#[test]
fn test_order_by_observation_sorts_by_timestamp() {
    let observed = vec![
        (3.0, RedirectHop::new("https://c.test/", 200)),
        (1.0, RedirectHop::new("https://a.test/", 302)),
        (2.0, RedirectHop::new("https://b.test/", 301)),
        (2.0, RedirectHop::new("https://b2.test/", 301)),
    ];
    let urls: Vec<String> = order_by_observation(observed)
        .into_iter()
        .map(|hop| hop.url)
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://a.test/",
            "https://b.test/",
            "https://b2.test/",
            "https://c.test/"
        ]
    );
}

#[tokio::test]
async fn test_http_client_returns_single_final_hop() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/start"))
            .respond_with(redirect_to("/middle")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/middle"))
            .respond_with(status_code(301).insert_header("Location", "/final")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/final"))
            .respond_with(status_code(200).body("landed")),
    );

    let start = server.url("/start").to_string();
    let chain = HttpClientTracer
        .trace(&http_trace_config(&start))
        .await
        .expect("trace should succeed");

    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].url, server.url("/final").to_string());
    assert_eq!(chain[0].status_code, 200);
}

#[tokio::test]
async fn test_http_client_error_status_is_not_a_failure() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/gone"))
            .respond_with(redirect_to("/missing")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/missing"))
            .respond_with(status_code(404)),
    );

    let start = server.url("/gone").to_string();
    let chain = HttpClientTracer
        .trace(&http_trace_config(&start))
        .await
        .expect("404 is a valid final response");

    assert_eq!(chain, vec![RedirectHop::new(server.url("/missing").to_string(), 404)]);
}

#[tokio::test]
async fn test_http_client_no_redirect() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(200)),
    );

    let start = server.url("/").to_string();
    let chain = HttpClientTracer
        .trace(&http_trace_config(&start))
        .await
        .expect("trace should succeed");
    assert_eq!(chain, vec![RedirectHop::new(start, 200)]);
}

#[tokio::test]
async fn test_http_client_redirect_loop_fails() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/loop"))
            .times(1..)
            .respond_with(redirect_to("/loop")),
    );

    let start = server.url("/loop").to_string();
    let result = HttpClientTracer.trace(&http_trace_config(&start)).await;
    assert!(matches!(result, Err(TraceError::Request(ref e)) if e.is_redirect()));
}

#[tokio::test]
async fn test_http_client_invalid_url_fails() {
    let result = HttpClientTracer
        .trace(&http_trace_config("not-a-url"))
        .await;
    assert!(matches!(result, Err(TraceError::InvalidUrl { .. })));
}

#[tokio::test]
async fn test_http_client_unreachable_host_fails() {
    let result = HttpClientTracer
        .trace(&http_trace_config("http://127.0.0.1:9/"))
        .await;
    assert!(matches!(result, Err(TraceError::Request(_))));
}

#[tokio::test]
async fn test_browser_invalid_url_returns_empty_chain() {
    // Rejected before a browser is launched
    let mut config = http_trace_config("javascript:alert(1)");
    config.strategy = TraceStrategy::ScriptedBrowser;
    let chain = BrowserTracer::new(None)
        .trace(&config)
        .await
        .expect("navigation errors are swallowed");
    assert!(chain.is_empty());
}

#[tokio::test]
async fn test_tracer_dispatches_on_strategy() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/dispatch"))
            .respond_with(status_code(204)),
    );

    let start = server.url("/dispatch").to_string();
    let chain = Tracer::new(None)
        .trace(&http_trace_config(&start))
        .await
        .expect("http-client trace should succeed");
    assert_eq!(chain[0].status_code, 204);
}

#[tokio::test]
#[ignore] // Requires a local Chromium and network access
async fn test_browser_records_https_document_chain() {
    let mut config = http_trace_config("http://github.com/");
    config.strategy = TraceStrategy::ScriptedBrowser;
    config.settle_timeout_ms = 1_000;
    let chain = BrowserTracer::new(None)
        .trace(&config)
        .await
        .expect("browser should launch");
    assert!(!chain.is_empty());
    assert!(chain.iter().all(|hop| hop.url.starts_with("https://")));
    assert_eq!(chain[0].url, "https://github.com/");
}
