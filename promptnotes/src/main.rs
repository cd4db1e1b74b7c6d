//! promptnotes-hook - Claude Code PostToolUse hook entry point
//!
//! Reads the hook payload from stdin, and when the payload records a
//! finished `git commit`, attaches the prompts behind it to the commit as a
//! git note. Wire it up in Claude Code settings:
//!
//! ```json
//! {
//!   "hooks": {
//!     "PostToolUse": [
//!       {
//!         "matcher": "Bash",
//!         "hooks": [{ "type": "command", "command": "promptnotes-hook" }]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/promptnotes/promptnotes.log (~/.local/state/promptnotes/promptnotes.log)
//! - Config: $XDG_CONFIG_HOME/promptnotes/config.toml (~/.config/promptnotes/config.toml)
//!
//! The process always exits 0. A prompt-extraction problem must never fail
//! the commit that triggered it, so every error ends up in the log file
//! instead of the exit status.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use promptnotes_core::hook::{self, HookOutcome, HookPayload};
use promptnotes_core::Config;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptnotes-hook")]
#[command(about = "Attach the prompts behind a commit as a git note")]
#[command(version)]
struct Args {
    /// Print the note instead of attaching it
    #[arg(long)]
    dry_run: bool,

    /// Read the hook payload from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    payload: Option<PathBuf>,

    /// Report the outcome on stdout (for manual runs; hooks stay silent)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    // A broken config file falls back to defaults; the warning lands in the
    // log once logging is up
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _log_guard = promptnotes_core::logging::init(&config.logging).ok();

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    if let Err(e) = run(&args, &config) {
        tracing::error!(error = %e, "Hook run failed");
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let raw = read_payload(args).context("failed to read hook payload")?;
    let payload = HookPayload::parse(&raw);

    let outcome = hook::run(&payload, config, args.dry_run)?;

    match outcome {
        HookOutcome::Skipped(reason) => {
            tracing::debug!(reason = reason.as_str(), "Skipped");
            if args.verbose >= 1 {
                println!("Skipped: {}", reason.as_str());
            }
        }
        HookOutcome::Empty { commit } => {
            tracing::info!(commit = %commit, "No prompts behind this commit");
            if args.verbose >= 1 {
                println!("No prompts behind {}", commit);
            }
        }
        HookOutcome::Rendered { commit, note } => {
            println!("Would annotate {}:\n", commit);
            println!("{}", note);
        }
        HookOutcome::Attached {
            commit,
            prompt_count,
        } => {
            tracing::info!(commit = %commit, prompts = prompt_count, "Note attached");
            if args.verbose >= 1 {
                println!("Attached {} prompt(s) to {}", prompt_count, commit);
            }
        }
    }

    Ok(())
}

fn read_payload(args: &Args) -> Result<String> {
    if let Some(path) = &args.payload {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read stdin")?;
    Ok(raw)
}
