//! Answer assembly.
//!
//! [`assemble`] turns a retrieval outcome into the markdown answer streamed to
//! the client. It is a pure function: identical inputs give byte-identical
//! output. Ranking belongs to the knowledge service, so passages and citations
//! are rendered in the order received.

use crate::{
    Mode,
    constants::{MAX_EXCERPTS, MAX_REFERENCES, SNIPPET_CHAR_LIMIT, TRUNCATION_MARKER},
    retrieval::{Citation, RetrievalContextItem, RetrievalOutcome, RetrievalResult},
};

mod demo;


pub use demo::demonstration_answer;

const UNTITLED_SECTION: &str = "Untitled section";
const SECTION_RULE: &str = "---";

/// Build the markdown answer for `query`.
///
/// Three shapes are possible:
/// - the service was unavailable: a notice that the backend may be unreachable
/// - the service answered with no passages: a notice that nothing matched
/// - otherwise: excerpts, references and a closing note framed by `mode`
pub fn assemble(mode: Mode, query: &str, outcome: &RetrievalOutcome) -> String {
    match outcome {
        RetrievalOutcome::Unavailable(_) => unavailable_answer(mode, query),
        RetrievalOutcome::Found(result) if result.context.is_empty() => {
            no_results_answer(mode, query)
        }
        RetrievalOutcome::Found(result) => grounded_answer(mode, query, result),
    }
}

fn grounded_answer(mode: Mode, query: &str, result: &RetrievalResult) -> String {
    let mut lines = vec![
        format!("## {} Answer", mode.label()),
        String::new(),
        framing(mode).to_string(),
        String::new(),
        quote(query),
        String::new(),
        SECTION_RULE.to_string(),
        String::new(),
        "### Key Passages".to_string(),
    ];

    for (index, item) in result.context.iter().take(MAX_EXCERPTS).enumerate() {
        lines.push(String::new());
        lines.push(format!("**Excerpt {}: {}**", index + 1, excerpt_label(item)));
        lines.push(String::new());
        lines.push(match item.snippet.as_deref() {
            Some(snippet) if !snippet.trim().is_empty() => truncate_snippet(snippet),
            _ => "_No excerpt text was provided for this passage._".to_string(),
        });
    }

    lines.extend([
        String::new(),
        SECTION_RULE.to_string(),
        String::new(),
        "### References".to_string(),
        String::new(),
    ]);
    if result.citations.is_empty() {
        lines.push("See context above.".to_string());
    } else {
        lines.extend(
            result
                .citations
                .iter()
                .take(MAX_REFERENCES)
                .map(|c| format!("- {}", reference(c))),
        );
    }

    lines.extend([
        String::new(),
        SECTION_RULE.to_string(),
        String::new(),
        closing_note(mode).to_string(),
    ]);
    lines.join("\n")
}

fn unavailable_answer(mode: Mode, query: &str) -> String {
    [
        "## Knowledge Service Unavailable".to_string(),
        String::new(),
        "I couldn't retrieve passages from the Nelson knowledge base for your question:"
            .to_string(),
        String::new(),
        quote(query),
        String::new(),
        format!("**Mode:** {}", mode.label()),
        String::new(),
        "The retrieval backend may be unreachable. Make sure the MCP server is running at its \
         configured URL, then ask again."
            .to_string(),
    ]
    .join("\n")
}

fn no_results_answer(mode: Mode, query: &str) -> String {
    [
        "## No Matching Passages".to_string(),
        String::new(),
        "The Nelson knowledge base returned no passages for your question:".to_string(),
        String::new(),
        quote(query),
        String::new(),
        format!("**Mode:** {}", mode.label()),
        String::new(),
        "Try rephrasing with more specific terms, such as the condition, the age group or the \
         presenting symptoms."
            .to_string(),
    ]
    .join("\n")
}

fn framing(mode: Mode) -> &'static str {
    match mode {
        Mode::Academic => {
            "A textbook-style synthesis from the Nelson Textbook of Pediatrics, with the \
             supporting passages quoted below."
        }
        Mode::Clinical => {
            "A practical summary for assessment and management at the point of care, based on \
             the passages below."
        }
    }
}

fn closing_note(mode: Mode) -> &'static str {
    match mode {
        Mode::Academic => {
            "_Academic mode: each passage above is tied to a chapter and page. Follow the \
             references for the full discussion and the primary evidence behind it._"
        }
        Mode::Clinical => {
            "_Clinical mode: apply these points to the individual patient. This summary \
             supports clinical judgment and does not replace it; consult the relevant pediatric \
             specialist for complex or atypical presentations._"
        }
    }
}

/// Echo text as a markdown blockquote, line by line.
fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn excerpt_label(item: &RetrievalContextItem) -> String {
    let title = non_blank(item.chapter_title.as_deref()).unwrap_or(UNTITLED_SECTION);
    let mut details = Vec::new();
    if let Some(page) = item.page_number {
        details.push(format!("p. {page}"));
    }
    if let Some(book) = non_blank(item.book_title.as_deref()) {
        details.push(book.to_string());
    }
    if details.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({})", details.join(", "))
    }
}

/// `<chapter title or 'Untitled section'>[, p. N]`
fn reference(citation: &Citation) -> String {
    let title = non_blank(citation.chapter_title.as_deref()).unwrap_or(UNTITLED_SECTION);
    match citation.page_number {
        Some(page) => format!("{title}, p. {page}"),
        None => title.to_string(),
    }
}

/// Keep at most [`SNIPPET_CHAR_LIMIT`] characters, marking the cut.
pub fn truncate_snippet(snippet: &str) -> String {
    match snippet.char_indices().nth(SNIPPET_CHAR_LIMIT) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
