use axum::http::StatusCode;
use nelson::{
    Mode,
    answer::demonstration_answer,
    api::{AnswerSource, HealthResponse, TEXT_CONTENT_TYPE},
};
use serde_json::{Value, json};

use crate::helpers::{
    PanickingGateway, StubReply, StubService, passages, start_chat_server,
    start_retrieval_chat_server,
};

async fn post_chat(base_url: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base_url}/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn assert_rejected(response: reqwest::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Missing required fields"}));
}

#[tokio::test]
async fn test_missing_message_is_rejected() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    let response = post_chat(&url, json!({"mode": "academic", "sessionId": "s1"})).await;
    assert_rejected(response).await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_each_required_field_is_checked() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    for body in [
        json!({"message": "fever", "sessionId": "s1"}),
        json!({"message": "fever", "mode": "academic"}),
        json!({"message": "", "mode": "academic", "sessionId": "s1"}),
        json!({"message": "fever", "mode": "surgical", "sessionId": "s1"}),
    ] {
        assert_rejected(post_chat(&url, body).await).await;
    }

    server.stop().await.unwrap();
}

async fn assert_internal_error(response: reqwest::Response) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_unparseable_body_is_an_internal_error() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    let response = reqwest::Client::new()
        .post(format!("{url}/api/chat"))
        .header("content-type", "application/json")
        .body("{\"message\": \"fever\",")
        .send()
        .await
        .unwrap();
    assert_internal_error(response).await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_whitespace_message_is_answered() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    let response = post_chat(
        &url,
        json!({"message": "   ", "mode": "academic", "sessionId": "s1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_panicking_gateway_returns_internal_error() {
    let (mut server, url) = start_chat_server(AnswerSource::retrieval(PanickingGateway)).await;

    let body = json!({"message": "fever", "mode": "clinical", "sessionId": "s1"});
    assert_internal_error(post_chat(&url, body.clone()).await).await;

    // The server keeps serving after the fault.
    assert_internal_error(post_chat(&url, body).await).await;
    let health = reqwest::get(format!("{url}/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unavailable_knowledge_service_still_answers() {
    let stub = StubService::start(StubReply::status(StatusCode::SERVICE_UNAVAILABLE)).await;
    let (mut server, url) = start_retrieval_chat_server(&stub.base_url).await;

    let response = post_chat(
        &url,
        json!({"message": "febrile infant workup", "mode": "clinical", "sessionId": "s1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        TEXT_CONTENT_TYPE
    );
    assert_eq!(
        response.headers()["transfer-encoding"].to_str().unwrap(),
        "chunked"
    );

    let text = response.text().await.unwrap();
    assert!(text.contains("Clinical"));
    assert!(text.contains("febrile infant workup"));
    assert!(text.contains("Knowledge Service Unavailable"));
    assert_eq!(stub.requests().len(), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_grounded_answer_uses_mode_passage_count() {
    let stub = StubService::start(StubReply::json(passages(4))).await;
    let (mut server, url) = start_retrieval_chat_server(&stub.base_url).await;

    let text = post_chat(
        &url,
        json!({"message": "iron deficiency", "mode": "academic", "sessionId": "s1"}),
    )
    .await
    .text()
    .await
    .unwrap();

    assert!(text.starts_with("## Academic Answer"));
    assert!(text.contains("**Excerpt 1: Chapter 1 (p. 101, Nelson Textbook of Pediatrics)**"));
    assert!(text.contains("Passage 3 text."));
    assert!(!text.contains("Passage 4 text."));
    assert!(text.contains("- Chapter 4, p. 104"));

    let requests = stub.requests();
    assert_eq!(
        requests[0],
        json!({
            "action": "godzilla_answer",
            "q": "iron deficiency",
            "k": Mode::Academic.top_k(),
            "specialty": "pediatrics",
        })
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_results_answer_differs_from_unavailable() {
    let empty = StubService::start(StubReply::json(json!({"context": [], "citations": []}))).await;
    let down = StubService::start(StubReply::status(StatusCode::BAD_GATEWAY)).await;
    let (mut empty_server, empty_url) = start_retrieval_chat_server(&empty.base_url).await;
    let (mut down_server, down_url) = start_retrieval_chat_server(&down.base_url).await;

    let body = json!({"message": "rare syndrome", "mode": "academic", "sessionId": "s1"});
    let no_results = post_chat(&empty_url, body.clone()).await.text().await.unwrap();
    let unavailable = post_chat(&down_url, body).await.text().await.unwrap();

    assert!(no_results.contains("No Matching Passages"));
    assert!(unavailable.contains("Knowledge Service Unavailable"));
    assert_ne!(no_results, unavailable);

    empty_server.stop().await.unwrap();
    down_server.stop().await.unwrap();
}

#[tokio::test]
async fn test_demonstration_body_is_the_whole_answer() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    let text = post_chat(
        &url,
        json!({"message": "anything", "mode": "clinical", "sessionId": "s1"}),
    )
    .await
    .text()
    .await
    .unwrap();

    assert_eq!(text, format!("{} ", demonstration_answer(Mode::Clinical)));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_health_reports_source() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;

    let response = reqwest::get(format!("{url}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = response.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.source, "demo");
    assert!(!health.version.is_empty());

    server.stop().await.unwrap();
}
