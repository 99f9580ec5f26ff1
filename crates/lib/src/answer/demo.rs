//! Demonstration answer used when no knowledge service is configured.

use crate::Mode;

/// A fixed answer describing what a fully wired deployment does.
pub fn demonstration_answer(mode: Mode) -> String {
    let mode_summary = match mode {
        Mode::Academic => {
            "Academic mode provides detailed textbook-style explanations with comprehensive \
             evidence and citations."
        }
        Mode::Clinical => {
            "Clinical mode focuses on practical diagnostic and treatment approaches for clinical \
             decision-making."
        }
    };

    format!(
        "# Response from Nelson-GPT

This is a demonstration response. A connected deployment will:

1. **Retrieve relevant content** from the Nelson Textbook of Pediatrics using semantic search
2. **Generate evidence-based answers** grounded in the retrieved passages
3. **Include citations** linking to specific chapters and pages
4. **Stream responses** so the answer appears while it is delivered

## Mode: {label}

{mode_summary}

## Next Steps

To connect the knowledge service:

1. **Start the MCP server** that indexes the textbook
2. **Point Nelson at it** with `MCP_SERVER_URL`
3. **Switch the answer source** to `retrieval`

---

**Citation Example:** Nelson Textbook of Pediatrics, Chapter 23, p. 456",
        label = mode.label(),
    )
}
