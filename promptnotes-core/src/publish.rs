//! Git notes publication
//!
//! Notes are attached with plain `git` subprocess calls. The notes ref is
//! ordinary repository state: `git notes --ref=prompts show <commit>` reads
//! one back, and the ref's own history is the version trail when a note is
//! replaced.

use crate::config::{NotesConfig, ReplicateConfig};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Attaches rendered notes to commits and mirrors the notes ref to a remote.
pub struct NotesPublisher {
    repo_dir: PathBuf,
    notes_ref: String,
    replicate: ReplicateConfig,
}

impl NotesPublisher {
    pub fn new(repo_dir: &Path, notes: &NotesConfig, replicate: &ReplicateConfig) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            notes_ref: notes.ref_name.clone(),
            replicate: replicate.clone(),
        }
    }

    /// Attach a note to a commit, replacing any previous note there.
    ///
    /// `-f` keeps re-runs idempotent: annotating the same commit twice
    /// leaves one note, not two.
    pub fn attach(&self, commit: &str, note: &str) -> Result<()> {
        let mut child = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(["notes", "--ref", &self.notes_ref, "add", "-f", "-F", "-", commit])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Git(format!("failed to run git notes: {}", e)))?;

        // Write the note through stdin; dropping the handle closes the pipe
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| Error::Git("git notes stdin unavailable".to_string()))?;
            stdin
                .write_all(note.as_bytes())
                .map_err(|e| Error::Git(format!("failed to write note: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Git(format!("git notes did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git notes add failed: {}",
                stderr.trim()
            )));
        }

        tracing::debug!(commit = %commit, notes_ref = %self.notes_ref, "Note attached");
        Ok(())
    }

    /// Push the notes ref to the configured remote, fire and forget.
    ///
    /// The push runs detached with its stdio discarded and is never waited
    /// on. Local annotation already succeeded by the time this runs, and a
    /// later push carries the ref forward anyway, so nothing here can fail
    /// the caller.
    pub fn replicate(&self) {
        if !self.replicate.enabled {
            return;
        }

        let refspec = format!("refs/notes/{0}:refs/notes/{0}", self.notes_ref);
        let spawned = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(["push", &self.replicate.remote, &refspec])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(_) => {
                tracing::debug!(
                    remote = %self.replicate.remote,
                    refspec = %refspec,
                    "Replication push started"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start replication push");
            }
        }
    }
}

/// Resolve the commit the repository's HEAD points at.
pub fn head_commit(repo_dir: &Path) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["rev-parse", "HEAD"])
        .output()
        .map_err(|e| Error::Git(format!("failed to run git rev-parse: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(format!(
            "git rev-parse HEAD failed: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
