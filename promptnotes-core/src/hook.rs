//! PostToolUse hook orchestration
//!
//! The hook fires after every tool call, and nearly all of them are not
//! commits. The payload pre-check filters those out from the payload alone,
//! before any file or subprocess work happens. Only a confirmed commit gets
//! the full pipeline: read the transcript, collect the prompts behind the
//! commit, render the note, attach it, replicate.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::note::render_note;
use crate::prompts::{collect_prompts, ToolCallMatcher};
use crate::publish::{head_commit, NotesPublisher};
use crate::transcript::read_transcript;
use serde::Deserialize;
use std::path::PathBuf;

/// Payload Claude Code pipes to a PostToolUse hook on stdin.
///
/// Every field is optional. A payload that does not describe a finished
/// commit is skipped, never an error.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct HookPayload {
    pub session_id: Option<String>,
    pub transcript_path: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub hook_event_name: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<serde_json::Value>,
    pub tool_response: Option<serde_json::Value>,
}

impl HookPayload {
    /// Parse a payload, degrading to an empty one when the JSON is
    /// malformed. An empty payload fails the pre-check and is skipped.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed hook payload");
            HookPayload::default()
        })
    }

    /// The command string of the tool invocation, when one exists.
    fn command(&self) -> Option<&str> {
        self.tool_input.as_ref()?.get("command")?.as_str()
    }

    /// Flattened textual output of the tool invocation.
    fn response_text(&self) -> Option<String> {
        let response = self.tool_response.as_ref()?;
        match response {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => {
                let mut parts = Vec::new();
                for key in ["stdout", "stderr"] {
                    if let Some(s) = map.get(key).and_then(|v| v.as_str()) {
                        if !s.is_empty() {
                            parts.push(s);
                        }
                    }
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
            _ => None,
        }
    }
}

/// Why a hook invocation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event is not PostToolUse
    WrongEvent,
    /// Some other tool ran
    WrongTool,
    /// The shell command was not a commit
    NotACommit,
    /// The payload carries no transcript path or no session id
    MissingIdentifiers,
    /// HEAD does not resolve in the working directory
    NoCommitFound,
    /// The tool output does not mention the new commit; it likely failed
    CommitUnconfirmed,
    /// The transcript file is gone
    TranscriptMissing,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::WrongEvent => "event is not PostToolUse",
            SkipReason::WrongTool => "tool is not the shell",
            SkipReason::NotACommit => "command is not a commit",
            SkipReason::MissingIdentifiers => "payload is missing transcript path or session id",
            SkipReason::NoCommitFound => "no commit to annotate",
            SkipReason::CommitUnconfirmed => "tool output does not confirm the commit",
            SkipReason::TranscriptMissing => "transcript file unavailable",
        }
    }
}

/// Result of one hook invocation.
#[derive(Debug)]
pub enum HookOutcome {
    /// Nothing to do for this payload
    Skipped(SkipReason),
    /// A commit happened but its segment has no prompts
    Empty { commit: String },
    /// Dry run: the note that would have been attached
    Rendered { commit: String, note: String },
    /// The note is attached and replication is underway
    Attached { commit: String, prompt_count: usize },
}

/// Inspect a hook payload and, when it records a finished commit, attach
/// the prompts behind that commit to it as a git note.
///
/// Extraction never fails: a payload that is not a commit, an absent
/// transcript, or an empty segment all come back as non-attached outcomes.
/// Only publication can return an error, and the caller decides how loudly
/// to report it.
pub fn run(payload: &HookPayload, config: &Config, dry_run: bool) -> Result<HookOutcome> {
    let matcher = ToolCallMatcher::default();

    if payload.hook_event_name.as_deref() != Some("PostToolUse") {
        return Ok(HookOutcome::Skipped(SkipReason::WrongEvent));
    }

    if payload.tool_name.as_deref() != Some(matcher.tool_name.as_str()) {
        return Ok(HookOutcome::Skipped(SkipReason::WrongTool));
    }

    let is_commit = payload
        .command()
        .map(|command| matcher.command_matches(command))
        .unwrap_or(false);
    if !is_commit {
        return Ok(HookOutcome::Skipped(SkipReason::NotACommit));
    }

    let (Some(transcript_path), Some(session_id)) = (
        payload.transcript_path.as_ref(),
        payload.session_id.as_deref(),
    ) else {
        return Ok(HookOutcome::Skipped(SkipReason::MissingIdentifiers));
    };

    let repo_dir = payload.cwd.clone().unwrap_or_else(|| PathBuf::from("."));

    let commit = match head_commit(&repo_dir) {
        Ok(commit) => commit,
        Err(e) => {
            tracing::debug!(error = %e, "HEAD did not resolve");
            return Ok(HookOutcome::Skipped(SkipReason::NoCommitFound));
        }
    };

    if !commit_confirmed(payload, &commit) {
        tracing::debug!(commit = %commit, "Commit not confirmed by tool output");
        return Ok(HookOutcome::Skipped(SkipReason::CommitUnconfirmed));
    }

    let records = match read_transcript(transcript_path) {
        Ok(records) => records,
        Err(Error::TranscriptUnavailable(detail)) => {
            tracing::warn!(detail = %detail, "Transcript unavailable, nothing to extract");
            return Ok(HookOutcome::Skipped(SkipReason::TranscriptMissing));
        }
        Err(e) => return Err(e),
    };

    let prompts = collect_prompts(&records, &matcher);

    let Some(note) = render_note(session_id, &prompts, chrono::Utc::now()) else {
        return Ok(HookOutcome::Empty { commit });
    };

    if dry_run {
        return Ok(HookOutcome::Rendered { commit, note });
    }

    let publisher = NotesPublisher::new(&repo_dir, &config.notes, &config.replicate);
    publisher.attach(&commit, &note)?;
    publisher.replicate();

    Ok(HookOutcome::Attached {
        commit,
        prompt_count: prompts.len(),
    })
}

/// True when the tool output acknowledges the commit HEAD points at.
///
/// A commit aborted by a pre-commit hook leaves HEAD at the previous commit,
/// whose abbreviated id fresh `git commit` output will not mention. Output
/// with no text at all is taken as confirmation.
fn commit_confirmed(payload: &HookPayload, commit: &str) -> bool {
    let Some(text) = payload.response_text() else {
        return true;
    };

    let short = &commit[..commit.len().min(7)];
    text.contains(short)
}
