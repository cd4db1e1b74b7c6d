//! # promptnotes-core
//!
//! Core library for promptnotes - records the user prompts behind each git
//! commit as a git note on that commit.
//!
//! This library provides:
//! - Tolerant parsing of Claude Code session transcripts
//! - Backward segment collection of the prompts behind a commit
//! - Note rendering and git-notes publication
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use promptnotes_core::prompts::{collect_prompts, ToolCallMatcher};
//! use promptnotes_core::transcript::read_transcript;
//! use std::path::Path;
//!
//! let records = read_transcript(Path::new("session.jsonl")).expect("readable transcript");
//! let prompts = collect_prompts(&records, &ToolCallMatcher::default());
//! for prompt in &prompts {
//!     println!("{}", prompt.text);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use hook::{HookOutcome, HookPayload, SkipReason};
pub use prompts::{collect_prompts, Prompt, ToolCallMatcher};

// Public modules
pub mod config;
pub mod error;
pub mod hook;
pub mod logging;
pub mod note;
pub mod prompts;
pub mod publish;
pub mod transcript;
