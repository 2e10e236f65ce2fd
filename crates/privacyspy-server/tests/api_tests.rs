use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use privacyspy_common::fetch::{FetchConfig, PolicyFetcher};
use privacyspy_common::pipeline::PolicyAnalyzer;
use privacyspy_common::weights::KeywordWeights;
use privacyspy_server::create_router;
use privacyspy_server::handlers::AppState;

const TOKEN: &str = "s3cret";

const POLICY_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Example Privacy</title></head>
<body>
  <nav><a href="/">Home</a> <a href="/blog">Blog</a></nav>
  <article>
    <h1>Privacy Policy</h1>
    <p>We collect your email address when you create an account with us.</p>
    <p>We never sell your personal information to advertisers. Contact us with any questions about this policy.</p>
  </article>
</body>
</html>"#;

const FRENCH_PAGE: &str = r#"<html><body><article>
  <h1>Politique de confidentialité</h1>
  <p>Nous collectons des informations vous concernant lorsque vous utilisez nos services.
  Cela comprend les informations que vous nous fournissez et celles que nous recevons de tiers.</p>
</article></body></html>"#;

const PLAIN_POLICY: &str = "We sell your data to our partners and we share it with them.\n\n\
                            Contact us if you have any questions.";

fn weights() -> KeywordWeights {
    KeywordWeights::from_map([
        ("collect", 1.0),
        ("sell", 2.0),
        ("share", 1.5),
        ("information", 0.5),
    ])
    .expect("valid weights")
}

async fn spawn_app(token: Option<&str>) -> String {
    let fetcher = PolicyFetcher::new(FetchConfig::default()).expect("http client");
    let analyzer = PolicyAnalyzer::new(Arc::new(weights()), fetcher);
    let app = create_router(AppState::new(analyzer, token));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serves policy pages for URL-based requests.
async fn spawn_policy_site() -> String {
    let site = Router::new()
        .route("/privacy", get(|| async { Html(POLICY_PAGE) }))
        .route("/fr/privacy", get(|| async { Html(FRENCH_PAGE) }))
        .route(
            "/privacy.txt",
            get(|| async { ([("content-type", "text/plain; charset=utf-8")], PLAIN_POLICY) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, site).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client() -> Client {
    Client::new()
}

async fn get_analyze(base_url: &str, query: &[(&str, &str)]) -> (StatusCode, Value) {
    let resp = client()
        .get(format!("{}/analyze", base_url))
        .query(query)
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    (status, resp.json().await.expect("json body"))
}

async fn post_analyze(base_url: &str, body: Value) -> (StatusCode, Value) {
    let resp = client()
        .post(format!("{}/analyze", base_url))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    (status, resp.json().await.expect("json body"))
}

fn assert_error(body: &Value, code: u64) {
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["status"], "error");
    assert_eq!(body["errorCode"], code, "unexpected body: {body}");
    assert!(body["response"].is_string());
}

#[tokio::test]
async fn index_explains_missing_request() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let resp = client().get(&base_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": "No API request received. See documentation for details."})
    );
}

#[tokio::test]
async fn health_reports_loaded_keywords() {
    let base_url = spawn_app(None).await;
    let resp = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["keywords"], 4);
}

#[tokio::test]
async fn missing_source_is_error_1() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let (status, body) = get_analyze(&base_url, &[("token", TOKEN)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 1);
    assert_eq!(body["response"], "No URL provided.");
}

#[tokio::test]
async fn missing_token_is_error_2() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let (status, body) = get_analyze(&base_url, &[("url", "https://example.com/privacy")]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 2);
    assert_eq!(body["response"], "No token provided.");
}

#[tokio::test]
async fn wrong_token_is_error_3() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let (status, body) = get_analyze(
        &base_url,
        &[("url", "https://example.com/privacy"), ("token", "guess")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 3);
    assert_eq!(body["response"], "Invalid token.");
}

#[tokio::test]
async fn unsupported_url_is_error_6() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let (status, body) = get_analyze(
        &base_url,
        &[("url", "ftp://example.com/privacy"), ("token", TOKEN)],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 6);
}

#[tokio::test]
async fn unknown_format_is_error_6() {
    let base_url = spawn_app(None).await;
    let (status, body) = get_analyze(
        &base_url,
        &[("text", "We sell your data."), ("format", "pdf")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 6);
}

#[tokio::test]
async fn upstream_failure_is_error_4() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let site = spawn_policy_site().await;
    let url = format!("{}/missing", site);
    let (status, body) = get_analyze(&base_url, &[("url", url.as_str()), ("token", TOKEN)]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_error(&body, 4);
}

#[tokio::test]
async fn non_english_policy_is_error_5() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let site = spawn_policy_site().await;
    let url = format!("{}/fr/privacy", site);
    let (status, body) = get_analyze(&base_url, &[("url", url.as_str()), ("token", TOKEN)]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error(&body, 5);
    assert_eq!(body["response"], "The Privacy Policy is not English.");
}

#[tokio::test]
async fn url_policy_is_scored_per_sentence() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let site = spawn_policy_site().await;
    let url = format!("{}/privacy", site);
    let (status, body) = get_analyze(&base_url, &[("url", url.as_str()), ("token", TOKEN)]).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["status"], "success");
    assert!(body.get("errorCode").is_none());

    let sentences = body["response"].as_array().expect("sentence list");
    let texts: Vec<&str> = sentences
        .iter()
        .map(|s| s["sentence"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Privacy Policy",
            "We collect your email address when you create an account with us.",
            "We never sell your personal information to advertisers.",
            "Contact us with any questions about this policy.",
        ]
    );

    // raw: 0, 1/5, 2.5/4, 0
    let scores: Vec<f64> = sentences
        .iter()
        .map(|s| s["score"].as_f64().unwrap())
        .collect();
    let expected = [0.0, 0.32, 1.0, 0.0];
    for (score, want) in scores.iter().zip(expected) {
        assert!((score - want).abs() < 1e-9, "scores: {scores:?}");
    }
}

#[tokio::test]
async fn plain_text_url_is_read_as_paragraphs() {
    let base_url = spawn_app(None).await;
    let site = spawn_policy_site().await;
    let url = format!("{}/privacy.txt", site);
    let (status, body) = get_analyze(&base_url, &[("url", url.as_str())]).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    let sentences = body["response"].as_array().expect("sentence list");
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0]["score"], 1.0);
    assert_eq!(sentences[1]["score"], 0.0);
}

#[tokio::test]
async fn posted_text_renders_markup() {
    let base_url = spawn_app(Some(TOKEN)).await;
    let (status, body) = post_analyze(
        &base_url,
        json!({"token": TOKEN, "text": PLAIN_POLICY, "format": "markup"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["status"], "success");
    // sell, data, partner, share
    assert_eq!(
        body["response"],
        "<p data-score=\"0.8750\">We sell your data to our partners and we share it with them.</p>\n\
         <p data-score=\"0.0000\">Contact us if you have any questions.</p>"
    );
}

#[tokio::test]
async fn posted_html_is_scored() {
    let base_url = spawn_app(None).await;
    let (status, body) = post_analyze(&base_url, json!({"html": POLICY_PAGE})).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["response"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn malformed_json_is_error_6() {
    let base_url = spawn_app(None).await;
    let resp = client()
        .post(format!("{}/analyze", base_url))
        .header("content-type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_error(&body, 6);
}

#[tokio::test]
async fn several_sources_are_error_6() {
    let base_url = spawn_app(None).await;
    let (status, body) = post_analyze(
        &base_url,
        json!({"url": "https://example.com/privacy", "text": "We sell your data."}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 6);
}
