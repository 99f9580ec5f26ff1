use std::sync::Arc;

use nelson::{
    FixedClock, Mode,
    answer::demonstration_answer,
    api::AnswerSource,
    client::{ChatClient, ERROR_REPLY},
    session::{Role, SessionStore},
};

use crate::helpers::{
    PanickingGateway, start_broken_chat_server, start_chat_server, start_raw_chat_server,
    unused_address,
};

fn store_in_session(mode: Mode) -> SessionStore {
    let mut store = SessionStore::with_clock(Arc::new(FixedClock::default()));
    store.start_conversation("What is the dose of amoxicillin?", mode);
    store
}

#[tokio::test]
async fn test_answer_lands_in_current_session() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;
    let client = ChatClient::new(&url).unwrap();
    let mut store = store_in_session(Mode::Clinical);

    let mut pieces = Vec::new();
    let answer = client
        .send_with(&mut store, "What is the dose of amoxicillin?", |piece| {
            pieces.push(piece.to_string())
        })
        .await
        .unwrap();

    let expected = format!("{} ", demonstration_answer(Mode::Clinical));
    assert_eq!(answer, expected);
    assert_eq!(pieces.concat(), expected);
    assert!(!store.is_loading());

    let session = store.current_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].role, Role::User);
    assert_eq!(session.messages[0].content, "What is the dose of amoxicillin?");
    assert_eq!(session.messages[1].role, Role::Assistant);
    assert_eq!(session.messages[1].content, expected);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_failed_request_shows_error_bubble() {
    let (mut server, url) = start_chat_server(AnswerSource::retrieval(PanickingGateway)).await;
    let client = ChatClient::new(&url).unwrap();
    let mut store = store_in_session(Mode::Academic);

    let err = client.send(&mut store, "growth charts").await.unwrap_err();
    assert_eq!(err.module(), "client");
    assert!(!err.is_network_error());
    assert!(!store.is_loading());

    let messages = &store.current_session().unwrap().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "growth charts");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, ERROR_REPLY);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_blank_message_is_not_sent() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;
    let client = ChatClient::new(&url).unwrap();
    let mut store = store_in_session(Mode::Academic);

    let err = client.send(&mut store, "   ").await.unwrap_err();
    assert!(err.is_validation_error());
    assert!(store.current_session().unwrap().messages.is_empty());
    assert!(!store.is_loading());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_utf8_from_server_is_replaced() {
    let url = start_raw_chat_server(vec![
        vec![0xFF, 0xC3],
        vec![0xA8],
        "é".as_bytes().to_vec(),
    ])
    .await;
    let client = ChatClient::new(&url).unwrap();
    let mut store = store_in_session(Mode::Academic);

    let mut pieces = Vec::new();
    let answer = client
        .send_with(&mut store, "growth charts", |piece| pieces.push(piece.to_string()))
        .await
        .unwrap();

    assert_eq!(answer, "\u{FFFD}èé");
    assert_eq!(pieces.concat(), answer);
    let last = store.current_session().unwrap().last_message().unwrap();
    assert_eq!(last.content, answer);
}

#[tokio::test]
async fn test_unreachable_server_shows_error_bubble() {
    let addr = unused_address().await;
    let client = ChatClient::new(&format!("http://{addr}")).unwrap();
    let mut store = store_in_session(Mode::Academic);

    let err = client.send(&mut store, "growth charts").await.unwrap_err();
    assert!(err.is_network_error());
    assert!(!store.is_loading());

    let messages = &store.current_session().unwrap().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, ERROR_REPLY);
}

#[tokio::test]
async fn test_interrupted_stream_keeps_partial_answer() {
    let url = start_broken_chat_server(&["Partial ", "answer "]).await;
    let client = ChatClient::new(&url).unwrap();
    let mut store = store_in_session(Mode::Academic);

    let err = client.send(&mut store, "growth charts").await.unwrap_err();
    assert!(err.is_network_error());
    assert!(!store.is_loading());

    let last = store.current_session().unwrap().last_message().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Partial"));
    assert_ne!(last.content, ERROR_REPLY);
}

#[tokio::test]
async fn test_health_via_client() {
    let (mut server, url) = start_chat_server(AnswerSource::Demonstration).await;
    let client = ChatClient::new(&url).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");

    server.stop().await.unwrap();
}
