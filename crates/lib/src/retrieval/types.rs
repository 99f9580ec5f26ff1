//! Wire types of the knowledge service protocol.
//!
//! Payloads come from an external service and are only checked for presence.
//! Keys are accepted in both `snake_case` and `camelCase`, numeric ids and
//! pages may arrive as numbers or strings, and `null` arrays read as empty.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{MCP_ACTION, MCP_SPECIALTY};

/// Body of the outbound knowledge service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRequest {
    pub action: String,
    pub q: String,
    pub k: usize,
    pub specialty: String,
}

impl McpRequest {
    /// Build the request for `query` with an explicit passage count.
    pub fn answer(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            action: MCP_ACTION.to_string(),
            q: query.into(),
            k: top_k,
            specialty: MCP_SPECIALTY.to_string(),
        }
    }
}

/// A retrieved excerpt candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalContextItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, alias = "chapter_title")]
    pub chapter_title: Option<String>,
    #[serde(default, alias = "page_number", deserialize_with = "lenient::opt_page")]
    pub page_number: Option<u32>,
    #[serde(default, alias = "source_file")]
    pub source_file: Option<String>,
    #[serde(default, alias = "book_title")]
    pub book_title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default, alias = "age_groups", deserialize_with = "lenient::null_as_default")]
    pub age_groups: Vec<String>,
    #[serde(default, alias = "medical_specialty")]
    pub medical_specialty: Option<String>,
    #[serde(default, alias = "clinical_relevance_score")]
    pub clinical_relevance_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub keywords: Vec<String>,
}

/// A reference entry shown to the end user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default, alias = "chapter_title")]
    pub chapter_title: Option<String>,
    #[serde(default, alias = "page_number", deserialize_with = "lenient::opt_page")]
    pub page_number: Option<u32>,
    #[serde(default, alias = "source_file")]
    pub source_file: Option<String>,
    #[serde(default, alias = "book_title")]
    pub book_title: Option<String>,
    #[serde(default, alias = "age_groups", deserialize_with = "lenient::null_as_default")]
    pub age_groups: Vec<String>,
}

/// A successful knowledge service response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub context: Vec<RetrievalContextItem>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
                StringOrNumber::String(s) => s,
                StringOrNumber::Number(n) => n.to_string(),
            }),
        )
    }

    /// Pages that are not positive integers are treated as absent.
    pub fn opt_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|v| match v {
                StringOrNumber::String(s) => s.trim().parse().ok(),
                StringOrNumber::Number(n) => n.as_u64().and_then(|p| u32::try_from(p).ok()),
            }),
        )
    }
}
