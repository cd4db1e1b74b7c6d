//! Note rendering
//!
//! Turns collected prompts into the markdown blob attached to a commit.
//! The layout is fixed so downstream tooling (`git log --notes=prompts`,
//! CI scripts) can rely on it.

use crate::prompts::Prompt;
use chrono::{DateTime, Utc};

/// Render the prompts behind a commit into a notes blob.
///
/// Returns `None` when there are no prompts; an empty note is never
/// attached. Prompts are numbered from 1 in chronological order, and a
/// prompt written under a non-default mode gets a bracketed label prefix:
///
/// ```text
/// ## Prompts
///
/// Session: 3f8a...
/// Captured: 2025-03-07T09:16:02Z
///
/// **1.** fix the login redirect loop
///
/// **2.** [plan] sketch the cookie cleanup
/// ```
pub fn render_note(
    session_id: &str,
    prompts: &[Prompt],
    captured_at: DateTime<Utc>,
) -> Option<String> {
    if prompts.is_empty() {
        return None;
    }

    let mut note = String::new();
    note.push_str("## Prompts\n\n");
    note.push_str(&format!("Session: {}\n", session_id));
    note.push_str(&format!(
        "Captured: {}\n",
        captured_at.format("%Y-%m-%dT%H:%M:%SZ")
    ));

    for (i, prompt) in prompts.iter().enumerate() {
        note.push('\n');
        match prompt.mode {
            Some(mode) => note.push_str(&format!(
                "**{}.** [{}] {}\n",
                i + 1,
                mode.label(),
                prompt.text
            )),
            None => note.push_str(&format!("**{}.** {}\n", i + 1, prompt.text)),
        }
    }

    Some(note)
}
