//! Prompt extraction
//!
//! Pulls the user prompts behind the most recent commit out of a session
//! transcript. The transcript is walked backward from the end: the first
//! commit invocation found is the one that just ran, and the user records
//! between it and the commit before it are the prompts that produced it.
//!
//! The walk is pure. Records go in, prompts come out; reading the transcript
//! file lives in [`crate::transcript`].

use crate::transcript::{ContentBlock, MessageContent, TranscriptRecord};

/// Longest prompt text carried into a note, in characters.
const MAX_PROMPT_CHARS: usize = 2000;

/// Appended to prompt text cut at [`MAX_PROMPT_CHARS`].
const TRUNCATION_MARKER: &str = "... [truncated]";

/// Signature of the tool invocation that marks a commit boundary.
#[derive(Debug, Clone)]
pub struct ToolCallMatcher {
    /// Tool that runs shell commands
    pub tool_name: String,
    /// Substring that identifies a commit command
    pub command_fragment: String,
}

impl Default for ToolCallMatcher {
    fn default() -> Self {
        Self {
            tool_name: "Bash".to_string(),
            command_fragment: "git commit".to_string(),
        }
    }
}

impl ToolCallMatcher {
    /// True when a command string is a commit invocation.
    pub fn command_matches(&self, command: &str) -> bool {
        command.contains(&self.command_fragment)
    }

    /// True when an assistant record embeds a commit invocation.
    ///
    /// The record must be assistant-typed with block content, and one of the
    /// blocks must be a `tool_use` of the configured tool whose `command`
    /// input contains the commit fragment. The first qualifying block wins.
    pub fn record_matches(&self, record: &TranscriptRecord) -> bool {
        if !record.is_type("assistant") {
            return false;
        }

        let Some(MessageContent::Blocks(blocks)) =
            record.message.as_ref().and_then(|m| m.content.as_ref())
        else {
            return false;
        };

        blocks.iter().any(|block| match block {
            ContentBlock::ToolUse { name, input } => {
                name == &self.tool_name
                    && input
                        .get("command")
                        .and_then(|v| v.as_str())
                        .map(|command| self.command_matches(command))
                        .unwrap_or(false)
            }
            _ => false,
        })
    }
}

/// Non-default interaction modes a prompt can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Plan,
    AutoAccept,
    Bypass,
    AcceptEdits,
}

impl PermissionMode {
    /// Maps a transcript `permissionMode` value. Unrecognized values and the
    /// default mode map to `None`; prompts in the default mode carry no tag.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "plan" => Some(PermissionMode::Plan),
            "dontAsk" => Some(PermissionMode::AutoAccept),
            "bypassPermissions" => Some(PermissionMode::Bypass),
            "acceptEdits" => Some(PermissionMode::AcceptEdits),
            _ => None,
        }
    }

    /// Short label rendered in front of the prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            PermissionMode::Plan => "plan",
            PermissionMode::AutoAccept => "auto-accept",
            PermissionMode::Bypass => "bypass",
            PermissionMode::AcceptEdits => "accept-edits",
        }
    }
}

/// One user prompt from the segment behind a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Normalized text, capped at [`MAX_PROMPT_CHARS`]
    pub text: String,
    /// Interaction mode the prompt was written under, when not the default
    pub mode: Option<PermissionMode>,
}

/// Flatten a record's message content into prompt text.
///
/// String content is trimmed as-is. Block content joins the trimmed text
/// blocks with newlines, then trims the result. Anything else (tool results,
/// images, unexpected shapes) contributes nothing.
pub fn record_text(record: &TranscriptRecord) -> String {
    let Some(content) = record.message.as_ref().and_then(|m| m.content.as_ref()) else {
        return String::new();
    };

    match content {
        MessageContent::Text(text) => text.trim().to_string(),
        MessageContent::Blocks(blocks) => {
            let parts: Vec<&str> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.trim()),
                    _ => None,
                })
                .collect();
            parts.join("\n").trim().to_string()
        }
        MessageContent::Other(_) => String::new(),
    }
}

/// Cap prompt text at [`MAX_PROMPT_CHARS`], marking the cut.
///
/// Counts characters, not bytes, so multi-byte prompts never split a
/// code point.
pub fn cap_text(text: &str) -> String {
    if text.chars().count() <= MAX_PROMPT_CHARS {
        return text.to_string();
    }

    let mut capped: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    capped.push_str(TRUNCATION_MARKER);
    capped
}

/// The interaction mode recorded on a record, when a recognized one was set.
pub fn record_mode(record: &TranscriptRecord) -> Option<PermissionMode> {
    record
        .permission_mode
        .as_deref()
        .and_then(PermissionMode::from_raw)
}

/// Walk state while scanning the transcript backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Still looking for the commit that triggered this run
    Seeking,
    /// Past the triggering commit, gathering the segment's prompts
    Collecting,
}

/// Collect the user prompts belonging to the segment behind the most recent
/// commit boundary, oldest first.
///
/// The walk runs newest to oldest. The first boundary encountered is the one
/// that triggered this run and is skipped. A second boundary ends the
/// segment, unless nothing has been collected yet. In that case it is
/// transparent: a commit with no prompt of its own (several commits in one
/// turn, say) picks up the prompts further back.
pub fn collect_prompts(records: &[TranscriptRecord], matcher: &ToolCallMatcher) -> Vec<Prompt> {
    let mut state = Walk::Seeking;
    let mut prompts: Vec<Prompt> = Vec::new();

    for record in records.iter().rev() {
        match state {
            Walk::Seeking => {
                if matcher.record_matches(record) {
                    state = Walk::Collecting;
                }
            }
            Walk::Collecting => {
                if matcher.record_matches(record) {
                    if !prompts.is_empty() {
                        break;
                    }
                    continue;
                }

                if record.is_type("user") {
                    let text = record_text(record);
                    if !text.is_empty() {
                        prompts.push(Prompt {
                            text: cap_text(&text),
                            mode: record_mode(record),
                        });
                    }
                }
            }
        }
    }

    // Collected newest-first; notes read oldest-first
    prompts.reverse();
    prompts
}
