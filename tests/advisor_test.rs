// SPDX-License-Identifier: PMPL-1.0-or-later
//! Advice client tests against a mock chat-completions endpoint

use canvasbot::advisor::{fallback_advice, AdviceClient, AdviceContext};
use canvasbot::config::{AdvisorConfig, RulesConfig};
use canvasbot::host::{ElementKind, JsonDocument};
use canvasbot::issue::{Category, Issue, Severity};
use canvasbot::scanner::Validator;
use std::time::{Duration, Instant};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS: &str = "/v1/chat/completions";

fn config(server: &MockServer) -> AdvisorConfig {
    AdvisorConfig {
        api_key: Some("test-key".to_string()),
        endpoint: format!("{}{}", server.uri(), COMPLETIONS),
        min_call_interval_ms: 0,
        initial_backoff_ms: 5,
        ..AdvisorConfig::default()
    }
}

fn client(config: &AdvisorConfig) -> AdviceClient {
    AdviceClient::from_config(config)
        .expect("client builds")
        .expect("api key is set")
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn issues() -> Vec<Issue> {
    vec![
        Issue::new(Severity::Error, Category::Contrast, "Low Color Contrast")
            .on_element(ElementKind::Text)
            .with_colors("#c8c8c8 on #ffffff")
            .with_font_size(14.0),
        Issue::new(Severity::Error, Category::AltText, "Missing Alt Text").on_element(ElementKind::Image),
    ]
}

const TWO_BLOCKS: &str = "[ISSUE 1]\n\
    RECOMMENDATION: Darken the text to at least #767676.\n\
    IMPLEMENTATION: Pick a darker swatch in the color panel.\n\
    WHY IT MATTERS: Low vision users cannot read faint text.\n\
    WCAG: 1.4.3\n\n\
    [ISSUE 2]\n\
    RECOMMENDATION: Describe what the image shows.\n";

#[tokio::test]
async fn test_bulk_advice_parses_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(bearer_token("test-key"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let advice = advisor.get_bulk_advice(&issues(), &AdviceContext::default()).await;

    assert_eq!(
        advice,
        vec![
            "Darken the text to at least #767676. Implementation: Pick a darker swatch in the color panel. \
             This matters because: Low vision users cannot read faint text. (1.4.3)"
                .to_string(),
            "Describe what the image shows.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_repeat_batch_hits_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(1)
        .mount(&server)
        .await;

    // A long interval proves a cache hit neither calls out nor waits
    let mut config = config(&server);
    config.min_call_interval_ms = 60_000;
    let advisor = client(&config);
    let context = AdviceContext::default();

    let first = advisor.get_bulk_advice(&issues(), &context).await;
    let started = Instant::now();
    let second = advisor.get_bulk_advice(&issues(), &context).await;

    assert_eq!(first, second);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(advisor.cached_entries().await, 1);
}

#[tokio::test]
async fn test_clear_cache_forces_new_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(2)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let context = AdviceContext::default();
    advisor.get_bulk_advice(&issues(), &context).await;
    advisor.clear_cache().await;
    assert_eq!(advisor.cached_entries().await, 0);
    advisor.get_bulk_advice(&issues(), &context).await;
}

#[tokio::test]
async fn test_server_errors_retry_then_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let advice = advisor.get_bulk_advice(&issues(), &AdviceContext::default()).await;

    assert_eq!(
        advice,
        vec![
            fallback_advice(Category::Contrast).to_string(),
            fallback_advice(Category::AltText).to_string(),
        ]
    );
    // Fallbacks are not cached
    assert_eq!(advisor.cached_entries().await, 0);
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let advice = advisor.get_bulk_advice(&issues(), &AdviceContext::default()).await;
    assert_eq!(advice[1], "Describe what the image shows.");
}

#[tokio::test]
async fn test_unstructured_reply_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("Sorry, I can only answer in prose."))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let advice = advisor.get_bulk_advice(&issues(), &AdviceContext::default()).await;
    assert_eq!(advice.len(), issues().len());
    assert_eq!(
        advice,
        vec![
            fallback_advice(Category::Contrast).to_string(),
            fallback_advice(Category::AltText).to_string(),
        ]
    );
}

#[tokio::test]
async fn test_short_reply_is_padded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("[ISSUE 1]\nRECOMMENDATION: Darken the text."))
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let advice = advisor.get_bulk_advice(&issues(), &AdviceContext::default()).await;
    assert_eq!(advice.len(), 2);
    assert_eq!(advice[0], "Darken the text.");
    assert_eq!(advice[1], fallback_advice(Category::AltText));
}

#[tokio::test]
async fn test_empty_batch_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(0)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    assert!(advisor.get_bulk_advice(&[], &AdviceContext::default()).await.is_empty());
}

#[tokio::test]
async fn test_rate_limit_spaces_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.min_call_interval_ms = 200;
    let advisor = client(&config);
    let context = AdviceContext::default();

    let started = Instant::now();
    advisor.get_bulk_advice(&issues(), &context).await;
    // Different batch, so not a cache hit
    advisor.get_bulk_advice(&issues()[..1], &context).await;
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_concurrent_batches_are_spaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(TWO_BLOCKS))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.min_call_interval_ms = 200;
    let advisor = client(&config);
    let context = AdviceContext::default();
    let all = issues();

    let started = Instant::now();
    let (both, first_only) = tokio::join!(
        advisor.get_bulk_advice(&all, &context),
        advisor.get_bulk_advice(&all[..1], &context)
    );

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(both.len(), 2);
    assert_eq!(first_only.len(), 1);
    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 2);
    assert_eq!(advisor.cached_entries().await, 2);
}

#[tokio::test]
async fn test_single_issue_advice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("  Use a darker gray such as #595959.  "))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = client(&config(&server));
    let issue = issues().remove(0);
    let context = AdviceContext::default();
    assert_eq!(advisor.advise(&issue, &context).await, "Use a darker gray such as #595959.");
    // Second request for the same fingerprint is served from cache
    assert_eq!(advisor.advise(&issue, &context).await, "Use a darker gray such as #595959.");
}

#[tokio::test]
async fn test_validator_attaches_advice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("[ISSUE 1]\nRECOMMENDATION: Darken the text."))
        .expect(1)
        .mount(&server)
        .await;

    let validator = Validator::new(RulesConfig::default(), Some(client(&config(&server))));
    let report = validator.validate_with_advice(&JsonDocument::sample()).await;

    assert_eq!(report.issues.len(), 7);
    assert_eq!(report.issues[0].ai_advice.as_deref(), Some("Darken the text."));
    for issue in &report.issues[1..] {
        assert_eq!(issue.ai_advice.as_deref(), Some(fallback_advice(issue.category)));
    }
}
