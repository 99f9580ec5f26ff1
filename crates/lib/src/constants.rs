//! Constants used throughout the Nelson library.
//!
//! Route paths, wire-level values of the knowledge service protocol and the
//! default pacing and limits of answer assembly.

use std::time::Duration;

/// Chat route served by the API.
pub const CHAT_PATH: &str = "/api/chat";

/// Health route served by the API.
pub const HEALTH_PATH: &str = "/health";

/// Path appended to the knowledge service base URL.
pub const MCP_PATH: &str = "/mcp";

/// Action name sent with every knowledge service request.
pub const MCP_ACTION: &str = "godzilla_answer";

/// Specialty sent with every knowledge service request.
pub const MCP_SPECIALTY: &str = "pediatrics";

/// Default knowledge service base URL (local development).
pub const DEFAULT_MCP_URL: &str = "http://localhost:8000";

/// Deadline for one knowledge service call.
pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(8);

/// Pause between two streamed tokens.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Passages requested in academic mode.
pub const ACADEMIC_TOP_K: usize = 12;

/// Passages requested in clinical mode.
pub const CLINICAL_TOP_K: usize = 8;

/// Context items rendered as excerpts.
pub const MAX_EXCERPTS: usize = 3;

/// Characters kept from one excerpt before truncation.
pub const SNIPPET_CHAR_LIMIT: usize = 600;

/// Appended to a cut excerpt.
pub const TRUNCATION_MARKER: &str = "…";

/// Citations listed in the References section.
pub const MAX_REFERENCES: usize = 10;

/// Characters of the first message kept in a session title.
pub const TITLE_CHAR_LIMIT: usize = 50;

/// Appended to a cut session title.
pub const TITLE_ELLIPSIS: &str = "...";

/// File name of the persisted session store inside the data directory.
pub const SESSIONS_FILE: &str = "sessions.json";
