//! Core building blocks shared by tasks and the release pipeline
//!
//! - **config**: shiprail.toml parsing and validation
//! - **context**: project context (root, actor, clock, git, config)
//! - **error**: error types with contextual help messages and exit codes
//! - **logging**: tracing subscriber setup
//! - **vcs**: git command bridge (SystemGit) and typed git operations

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod vcs;
