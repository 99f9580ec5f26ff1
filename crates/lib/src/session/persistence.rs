//! Persistence operations for the session store
//!
//! Saves and loads the store as a versioned JSON document so a client can
//! resume with identical sessions, messages and ordering.

use std::{path::Path, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize};

use super::{ChatSession, SessionError, SessionStore, Settings, Tab};
use crate::{Clock, Mode, Result};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

fn default_show_welcome() -> bool {
    true
}

/// On-disk shape of a [`SessionStore`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    sessions: Vec<ChatSession>,
    #[serde(default)]
    current_session_id: Option<String>,
    #[serde(default)]
    current_mode: Mode,
    #[serde(default = "default_show_welcome")]
    show_welcome: bool,
    #[serde(default)]
    active_tab: Tab,
    #[serde(default)]
    settings: Settings,
}

impl SerializableStore {
    fn from_store(store: &SessionStore) -> Self {
        Self {
            version: PERSISTENCE_VERSION,
            sessions: store.sessions.clone(),
            current_session_id: store.current_session_id.clone(),
            current_mode: store.current_mode,
            show_welcome: store.show_welcome,
            active_tab: store.active_tab,
            settings: store.settings.clone(),
        }
    }

    fn into_store(self, clock: Arc<dyn Clock>) -> SessionStore {
        // A selection pointing at a session that is no longer stored is dropped.
        let current_session_id = self
            .current_session_id
            .filter(|id| self.sessions.iter().any(|s| &s.id == id));

        let mut store = SessionStore::with_clock(clock);
        store.sessions = self.sessions;
        store.current_session_id = current_session_id;
        store.current_mode = self.current_mode;
        store.show_welcome = self.show_welcome;
        store.active_tab = self.active_tab;
        store.settings = self.settings;
        store
    }
}

/// Saves the store to a JSON file.
///
/// Writes to a sibling temporary file first and renames it into place, so a
/// crash mid-write leaves the previous file intact.
pub(super) fn save_to_file<P: AsRef<Path>>(store: &SessionStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&SerializableStore::from_store(store))
        .map_err(|source| SessionError::SerializationFailed { source })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SessionError::FileIo {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(|source| SessionError::FileIo {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| SessionError::FileIo {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        sessions = store.sessions.len(),
        "saved session store"
    );
    Ok(())
}

/// Loads the store from a JSON file.
///
/// If the file does not exist, a new, empty store is returned.
pub(super) fn load_from_file<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<SessionStore> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(SessionStore::with_clock(clock));
        }
        Err(source) => {
            return Err(SessionError::FileIo {
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
    };

    let serializable: SerializableStore =
        serde_json::from_str(&json).map_err(|source| SessionError::DeserializationFailed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(serializable.into_store(clock))
}
