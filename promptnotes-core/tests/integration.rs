//! Integration tests for transcript reading, prompt extraction, and git
//! notes publication
//!
//! Fixture transcripts live in `tests/fixtures/`. Tests that talk to git
//! build a throwaway repository in a temp dir and skip when no git binary
//! is on PATH.

use promptnotes_core::config::{Config, ReplicateConfig};
use promptnotes_core::hook::{self, HookOutcome, HookPayload, SkipReason};
use promptnotes_core::prompts::{collect_prompts, PermissionMode, ToolCallMatcher};
use promptnotes_core::publish::{head_commit, NotesPublisher};
use promptnotes_core::transcript::read_transcript;
use promptnotes_core::Error;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn try_git(repo: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("failed to run git")
}

fn git(repo: &Path, args: &[&str]) -> Output {
    let output = try_git(repo, args);
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Create a repository with one commit and return its path
fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "dev@example.com"]);
    git(dir, &["config", "user.name", "Dev"]);
    std::fs::write(dir.join("README.md"), "hello\n").expect("failed to seed repo");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "--no-gpg-sign", "-m", "initial"]);
}

// No remote in the throwaway repos; keep runs self-contained
fn test_config() -> Config {
    Config {
        replicate: ReplicateConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn commit_payload(repo: &Path, transcript: &Path, commit: &str) -> HookPayload {
    let short = &commit[..7];
    serde_json::from_value(json!({
        "session_id": "test-session-001",
        "transcript_path": transcript.to_string_lossy(),
        "cwd": repo.to_string_lossy(),
        "hook_event_name": "PostToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "git commit -am 'fix login redirect'"},
        "tool_response": {"stdout": format!("[main {}] fix login redirect", short)}
    }))
    .expect("payload should deserialize")
}

// ============================================
// Transcript fixtures
// ============================================

#[test]
fn test_read_commit_session_fixture() {
    let records = read_transcript(&fixture_path("commit-session.jsonl")).unwrap();

    // summary + 2 user prompts + tool result + 3 assistant records
    assert_eq!(records.len(), 7);

    let prompts = collect_prompts(&records, &ToolCallMatcher::default());
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].text, "fix the login redirect loop");
    assert_eq!(prompts[0].mode, None);
    assert_eq!(prompts[1].text, "also drop the stale cookie");
    assert_eq!(prompts[1].mode, Some(PermissionMode::AcceptEdits));
}

#[test]
fn test_messy_fixture_skips_bad_lines() {
    let records = read_transcript(&fixture_path("messy-session.jsonl")).unwrap();

    // The malformed line and the blank line disappear; the record with an
    // unexpected content shape survives but contributes no text.
    assert_eq!(records.len(), 5);

    let prompts = collect_prompts(&records, &ToolCallMatcher::default());
    let texts: Vec<&str> = prompts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["first ask", "second ask"]);
}

#[test]
fn test_two_commits_fixture_stops_at_prior_boundary() {
    let records = read_transcript(&fixture_path("two-commits.jsonl")).unwrap();

    let prompts = collect_prompts(&records, &ToolCallMatcher::default());
    let texts: Vec<&str> = prompts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["now add the index"]);
}

#[test]
fn test_missing_transcript_is_unavailable() {
    let result = read_transcript(Path::new("/nonexistent/session.jsonl"));
    assert!(matches!(result, Err(Error::TranscriptUnavailable(_))));
}

// ============================================
// Git notes publication
// ============================================

#[test]
fn test_attach_and_read_back_note() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let config = test_config();
    let publisher = NotesPublisher::new(dir.path(), &config.notes, &config.replicate);

    let note = "## Prompts\n\nSession: s-1\nCaptured: 2025-03-07T09:16:02Z\n\n**1.** fix bug\n";
    publisher.attach(&commit, note).unwrap();

    let shown = git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    let shown = String::from_utf8_lossy(&shown.stdout);
    assert_eq!(shown.trim_end(), note.trim_end());
    assert!(shown.contains("**1.** fix bug"));
}

#[test]
fn test_attach_replaces_existing_note() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let config = test_config();
    let publisher = NotesPublisher::new(dir.path(), &config.notes, &config.replicate);

    publisher.attach(&commit, "## Prompts\n\n**1.** first\n").unwrap();
    publisher.attach(&commit, "## Prompts\n\n**1.** second\n").unwrap();

    let shown = git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    let shown = String::from_utf8_lossy(&shown.stdout);
    assert!(shown.contains("second"));
    assert!(!shown.contains("first"));

    let listed = git(dir.path(), &["notes", "--ref", "prompts", "list"]);
    let listed = String::from_utf8_lossy(&listed.stdout);
    assert_eq!(listed.lines().count(), 1, "one note per commit, not two");
}

#[test]
fn test_attach_respects_configured_ref() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let mut config = test_config();
    config.notes.ref_name = "session-prompts".to_string();
    let publisher = NotesPublisher::new(dir.path(), &config.notes, &config.replicate);
    publisher.attach(&commit, "note body\n").unwrap();

    let shown = git(
        dir.path(),
        &["notes", "--ref", "session-prompts", "show", &commit],
    );
    assert!(String::from_utf8_lossy(&shown.stdout).contains("note body"));

    let default_ref = try_git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    assert!(!default_ref.status.success());
}

#[test]
fn test_attach_rejects_invalid_ref() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    // ".." is never legal in a refname, so the add fails deterministically
    let mut config = test_config();
    config.notes.ref_name = "bad..ref".to_string();
    let publisher = NotesPublisher::new(dir.path(), &config.notes, &config.replicate);

    let result = publisher.attach(&commit, "note body\n");
    assert!(matches!(result, Err(Error::Git(_))));
}

#[test]
fn test_head_commit_outside_repo_fails() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let result = head_commit(dir.path());
    assert!(matches!(result, Err(Error::Git(_))));
}

#[test]
fn test_replicate_failure_is_invisible() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());

    let config = Config::default();
    assert!(config.replicate.enabled);

    // No "origin" remote exists; the detached push dies on its own without
    // surfacing anything here.
    let publisher = NotesPublisher::new(dir.path(), &config.notes, &config.replicate);
    publisher.replicate();
}

// ============================================
// End-to-end hook runs
// ============================================

#[test]
fn test_hook_attaches_note_in_repo() {
    promptnotes_core::logging::init_test();
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let transcript = fixture_path("commit-session.jsonl");
    let payload = commit_payload(dir.path(), &transcript, &commit);

    let outcome = hook::run(&payload, &test_config(), false).unwrap();
    match outcome {
        HookOutcome::Attached {
            commit: attached,
            prompt_count,
        } => {
            assert_eq!(attached, commit);
            assert_eq!(prompt_count, 2);
        }
        other => panic!("expected Attached, got {:?}", other),
    }

    let shown = git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    let shown = String::from_utf8_lossy(&shown.stdout);
    assert!(shown.contains("## Prompts"));
    assert!(shown.contains("Session: test-session-001"));
    assert!(shown.contains("**1.** fix the login redirect loop"));
    assert!(shown.contains("**2.** [accept-edits] also drop the stale cookie"));
}

#[test]
fn test_hook_dry_run_touches_nothing() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let transcript = fixture_path("commit-session.jsonl");
    let payload = commit_payload(dir.path(), &transcript, &commit);

    let outcome = hook::run(&payload, &test_config(), true).unwrap();
    match outcome {
        HookOutcome::Rendered { note, .. } => {
            assert!(note.contains("**1.** fix the login redirect loop"));
        }
        other => panic!("expected Rendered, got {:?}", other),
    }

    let shown = try_git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    assert!(!shown.status.success(), "dry run must not attach anything");
}

#[test]
fn test_hook_empty_segment_attaches_nothing() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    // A transcript whose only record is the commit itself
    let transcript = dir.path().join("lonely.jsonl");
    std::fs::write(
        &transcript,
        r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"git commit -m 'x'"}}]}}"#,
    )
    .unwrap();

    let payload = commit_payload(dir.path(), &transcript, &commit);
    let outcome = hook::run(&payload, &test_config(), false).unwrap();
    assert!(matches!(outcome, HookOutcome::Empty { .. }));

    let shown = try_git(dir.path(), &["notes", "--ref", "prompts", "show", &commit]);
    assert!(!shown.status.success());
}

#[test]
fn test_hook_skips_unconfirmed_commit() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let transcript = fixture_path("commit-session.jsonl");
    let mut payload = commit_payload(dir.path(), &transcript, &commit);
    // Output of a commit the pre-commit hook rejected
    payload.tool_response = Some(json!({"stdout": "", "stderr": "pre-commit: lint failed"}));

    let outcome = hook::run(&payload, &test_config(), false).unwrap();
    assert!(matches!(
        outcome,
        HookOutcome::Skipped(SkipReason::CommitUnconfirmed)
    ));
}

#[test]
fn test_hook_skips_missing_transcript() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    init_repo(dir.path());
    let commit = head_commit(dir.path()).unwrap();

    let transcript = dir.path().join("gone.jsonl");
    let payload = commit_payload(dir.path(), &transcript, &commit);

    let outcome = hook::run(&payload, &test_config(), false).unwrap();
    assert!(matches!(
        outcome,
        HookOutcome::Skipped(SkipReason::TranscriptMissing)
    ));
}

#[test]
fn test_hook_skips_outside_repo() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let transcript = fixture_path("commit-session.jsonl");

    let payload: HookPayload = serde_json::from_value(json!({
        "session_id": "test-session-001",
        "transcript_path": transcript.to_string_lossy(),
        "cwd": dir.path().to_string_lossy(),
        "hook_event_name": "PostToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "git commit -m 'x'"}
    }))
    .unwrap();

    let outcome = hook::run(&payload, &test_config(), false).unwrap();
    assert!(matches!(
        outcome,
        HookOutcome::Skipped(SkipReason::NoCommitFound)
    ));
}
