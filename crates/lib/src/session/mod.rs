//! Client-side session store.
//!
//! [`SessionStore`] owns every chat session, the messages inside them and the
//! surrounding client state (active mode, navigation, settings). It is a plain
//! owned value: the application root creates one and hands out `&mut` access,
//! and tests build isolated instances with their own [`Clock`].
//!
//! All mutations are synchronous. The store is never shared between threads
//! while being written, so it carries no locks.

use std::{path::Path, sync::Arc};

use uuid::Uuid;

use crate::{
    Clock, Mode, Result, SystemClock,
    constants::{TITLE_CHAR_LIMIT, TITLE_ELLIPSIS},
};

mod errors;
mod persistence;
mod types;


pub use errors::SessionError;
pub use types::{ChatSession, FontSize, Message, MessageCitation, Role, Settings, Tab, Theme};

/// Derive a session title from the first message of a conversation.
///
/// Keeps the first 50 characters and appends `...` when the message was longer.
pub fn derive_title(first_message: &str) -> String {
    let mut chars = first_message.chars();
    let head: String = chars.by_ref().take(TITLE_CHAR_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}{TITLE_ELLIPSIS}")
    } else {
        head
    }
}

/// In-memory sessions and client state.
#[derive(Debug)]
pub struct SessionStore {
    /// Newest session first.
    pub(crate) sessions: Vec<ChatSession>,
    pub(crate) current_session_id: Option<String>,
    pub(crate) current_mode: Mode,
    pub(crate) show_welcome: bool,
    pub(crate) active_tab: Tab,
    pub(crate) settings: Settings,
    /// Not persisted: a reload never resumes an in-flight request.
    pub(crate) is_loading: bool,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates an empty store on system time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading timestamps from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Vec::new(),
            current_session_id: None,
            current_mode: Mode::default(),
            show_welcome: true,
            active_tab: Tab::default(),
            settings: Settings::default(),
            is_loading: false,
            clock,
        }
    }

    /// Saves the store to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path, Arc::new(SystemClock))
    }

    /// Loads a store from a JSON file, reading future timestamps from `clock`.
    pub fn load_from_file_with_clock<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<Self> {
        persistence::load_from_file(path, clock)
    }

    /// The clock this store stamps sessions with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Generate a fresh message id.
    pub fn next_message_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    // === Sessions ===

    /// Creates a new session at the front of the list and makes it current.
    ///
    /// The session inherits the current mode. Hides the welcome screen.
    ///
    /// # Returns
    /// The id of the new session.
    pub fn create_session(&mut self, seed_title: impl Into<String>) -> String {
        let now = self.clock.now_utc();
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            title: seed_title.into(),
            messages: Vec::new(),
            mode: self.current_mode,
            created_at: now,
            updated_at: now,
        };
        let id = session.id.clone();
        tracing::debug!(session_id = %id, mode = %session.mode, "created session");

        self.sessions.insert(0, session);
        self.current_session_id = Some(id.clone());
        self.show_welcome = false;
        id
    }

    /// Welcome-screen flow: switch to `mode`, then open a session titled after
    /// the first message.
    pub fn start_conversation(&mut self, first_message: &str, mode: Mode) -> String {
        self.set_mode(mode);
        self.create_session(derive_title(first_message))
    }

    /// Selects an existing session.
    ///
    /// # Errors
    /// `SessionError::SessionNotFound` if no session has that id; the current
    /// selection is left untouched.
    pub fn set_current_session(&mut self, session_id: &str) -> Result<()> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(SessionError::SessionNotFound {
                id: session_id.to_string(),
            }
            .into());
        }
        self.current_session_id = Some(session_id.to_string());
        self.show_welcome = false;
        Ok(())
    }

    /// Adds a message to the current session.
    ///
    /// A message whose id is already present replaces that message's content
    /// and citations in place; anything else is appended. The session's
    /// `updated_at` is refreshed in both cases.
    ///
    /// # Errors
    /// `SessionError::NoActiveSession` when no session is selected. No session
    /// is modified in that case.
    pub fn add_message(&mut self, message: Message) -> Result<()> {
        let now = self.clock.now_utc();
        let session = self.current_session_mut()?;

        match session.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => {
                existing.content = message.content;
                existing.citations = message.citations;
            }
            None => session.messages.push(message),
        }
        session.updated_at = now;
        Ok(())
    }

    /// Removes a session. Clears the selection if it was current.
    ///
    /// # Returns
    /// Whether a session was removed.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        if self.current_session_id.as_deref() == Some(session_id) {
            self.current_session_id = None;
        }
        let removed = self.sessions.len() != before;
        if removed {
            tracing::debug!(session_id, "deleted session");
        }
        removed
    }

    /// Renames a session to the trimmed `new_title`.
    ///
    /// Blank titles are ignored.
    ///
    /// # Returns
    /// Whether the title changed.
    pub fn rename_session(&mut self, session_id: &str, new_title: &str) -> bool {
        let title = new_title.trim();
        if title.is_empty() {
            return false;
        }
        let now = self.clock.now_utc();
        match self.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.title = title.to_string();
                session.updated_at = now;
                true
            }
            None => false,
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, session_id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    fn current_session_mut(&mut self) -> Result<&mut ChatSession> {
        let id = self
            .current_session_id
            .as_deref()
            .ok_or(SessionError::NoActiveSession)?;
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SessionError::NoActiveSession.into())
    }

    // === Client state ===

    pub fn current_mode(&self) -> Mode {
        self.current_mode
    }

    /// Sets the mode used for new sessions and outgoing questions.
    pub fn set_mode(&mut self, mode: Mode) {
        self.current_mode = mode;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn show_welcome(&self) -> bool {
        self.show_welcome
    }

    pub fn set_show_welcome(&mut self, show: bool) {
        self.show_welcome = show;
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
    }

    pub fn set_font_size(&mut self, font_size: FontSize) {
        self.settings.font_size = font_size;
    }

    pub fn set_show_disclaimer(&mut self, show: bool) {
        self.settings.show_disclaimer = show;
    }
}
