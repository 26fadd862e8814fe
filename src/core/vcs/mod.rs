pub mod system_git;
mod system_git_ops;

#[cfg(test)]
pub mod fake;

pub use system_git::SystemGit;
pub use system_git_ops::{GitOps, StashOutcome};

use crate::core::error::ShipResult;

/// Executes git subcommands in a working tree.
///
/// Returns stdout on success. A nonzero exit status, or output matching a
/// known failure pattern, is a `GitError::CommandFailed`. No retries.
pub trait GitBridge: Send + Sync {
  fn run(&self, args: &[&str]) -> ShipResult<String>;
}

/// A commit read from `git log`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
  pub sha: String,
  pub message: String,
}
