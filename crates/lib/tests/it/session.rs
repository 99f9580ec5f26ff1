use std::sync::Arc;

use nelson::{
    FixedClock, Mode,
    session::{Message, MessageCitation, SessionStore, Tab, Theme},
};

fn store_with_history(clock: &FixedClock) -> SessionStore {
    let mut store = SessionStore::with_clock(Arc::new(clock.clone()));
    store.start_conversation("What are the causes of neonatal jaundice?", Mode::Clinical);
    let now = store.clock().now_utc();
    store
        .add_message(Message::user("m1", "What are the causes of neonatal jaundice?", now))
        .unwrap();
    store
        .add_message(
            Message::assistant("m2", "Physiologic jaundice is the most common.", now).with_citations(
                vec![MessageCitation {
                    chapter: "Jaundice and Hyperbilirubinemia in the Newborn".to_string(),
                    page: 871,
                    text: "Physiologic jaundice".to_string(),
                }],
            ),
        )
        .unwrap();
    store.create_session("Second chat");
    store.set_theme(Theme::Dark);
    store.set_active_tab(Tab::History);
    store
}

#[test]
fn test_store_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    let clock = FixedClock::default();
    let store = store_with_history(&clock);

    store.save_to_file(&path).unwrap();
    let loaded = SessionStore::load_from_file_with_clock(&path, Arc::new(clock.clone())).unwrap();

    assert_eq!(loaded.sessions(), store.sessions());
    assert_eq!(loaded.current_session_id(), store.current_session_id());
    assert_eq!(loaded.current_mode(), Mode::Clinical);
    assert_eq!(loaded.settings().theme, Theme::Dark);
    assert_eq!(loaded.active_tab(), Tab::History);
    assert!(!loaded.show_welcome());
    assert!(!loaded.is_loading());

    let first = &loaded.sessions()[1];
    assert_eq!(first.title, "What are the causes of neonatal jaundice?");
    assert_eq!(first.messages.len(), 2);
    assert_eq!(first.messages[1].citations.as_ref().unwrap()[0].page, 871);
}

#[test]
fn test_missing_file_gives_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::load_from_file(dir.path().join("absent.json")).unwrap();

    assert!(store.sessions().is_empty());
    assert!(store.current_session_id().is_none());
    assert!(store.show_welcome());
}

#[test]
fn test_saving_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("sessions.json");
    let store = store_with_history(&FixedClock::default());

    store.save_to_file(&path).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_unsupported_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    std::fs::write(&path, r#"{"_v": 7, "sessions": []}"#).unwrap();

    let err = SessionStore::load_from_file(&path).unwrap_err();
    assert!(err.is_io_error());
    assert_eq!(err.module(), "session");
}

#[test]
fn test_dangling_selection_is_dropped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    std::fs::write(&path, r#"{"sessions": [], "currentSessionId": "gone"}"#).unwrap();

    let store = SessionStore::load_from_file(&path).unwrap();
    assert!(store.current_session_id().is_none());
}
