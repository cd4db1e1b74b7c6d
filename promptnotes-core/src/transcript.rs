//! Claude Code session transcript parsing
//!
//! A transcript is newline-delimited JSON, one record per line, appended as
//! the session runs. Only three things matter here: the record `type`
//! (`user`, `assistant`, anything else), the message content, and the
//! `permissionMode` some user records carry. Everything else on a line is
//! ignored.
//!
//! # Error Handling
//!
//! The reader is designed to be resilient:
//!
//! - **Malformed JSON lines**: Logged at debug level, line skipped, reading
//!   continues. A transcript is never rejected as a whole.
//!
//! - **Missing fields**: Every field is optional via `#[serde(default)]`.
//!
//! - **Unexpected content shapes**: Deserialize into [`MessageContent::Other`]
//!   and contribute no text rather than failing the record.
//!
//! - **Unknown content block types**: Converted to [`ContentBlock::Unknown`]
//!   and ignored.
//!
//! Only a missing or unreadable file is an error, and callers treat that as
//! "nothing to extract" rather than a failure.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Represents a single line of a session transcript.
///
/// Uses `#[serde(default)]` liberally to handle missing fields gracefully.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptRecord {
    /// Record kind: "user", "assistant", or anything else
    #[serde(rename = "type")]
    pub record_type: Option<String>,

    /// Message content
    pub message: Option<RecordMessage>,

    /// Interaction mode active when a user record was written
    pub permission_mode: Option<String>,
}

impl TranscriptRecord {
    /// True when the record's `type` equals the given kind.
    pub fn is_type(&self, kind: &str) -> bool {
        self.record_type.as_deref() == Some(kind)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RecordMessage {
    pub role: Option<String>,
    pub content: Option<MessageContent>,
}

/// Message content is either a plain string or a list of typed blocks.
///
/// Anything else lands in `Other` and contributes no text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    // Catch-all for tool_result, image, and anything newer
    #[serde(other)]
    Unknown,
}

/// Read every parseable record from a transcript file, in file order.
///
/// Lines that are blank or fail to parse are skipped; the rest of the file
/// is still read. Only a missing or unreadable file is an error.
pub fn read_transcript(path: &Path) -> Result<Vec<TranscriptRecord>> {
    let file = File::open(path)
        .map_err(|e| Error::TranscriptUnavailable(format!("{}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut line_number = 0;

    for line_result in reader.lines() {
        line_number += 1;

        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::debug!(line = line_number, error = %e, "skipping unreadable line");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TranscriptRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!(line = line_number, error = %e, "skipping malformed line");
            }
        }
    }

    Ok(records)
}
