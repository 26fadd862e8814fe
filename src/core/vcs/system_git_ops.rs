//! Typed git operations layered over any [`GitBridge`]
//!
//! The release pipeline talks to git only through these helpers, so a
//! scripted bridge can stand in for a real repository in tests.

use super::{CommitInfo, GitBridge};
use crate::core::error::{GitError, ShipError, ShipResult};
use regex::Regex;
use std::sync::LazyLock;

/// `git stash` prints this (case varies across versions) when nothing was stashed
static NO_LOCAL_CHANGES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)no local changes to save").expect("static regex"));

/// Field and record separators for `git log --format`
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Result of `git stash`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashOutcome {
  /// Local changes were stashed and must be restored later
  Saved,
  /// Nothing to stash; restoring would pop an unrelated stash
  NothingToSave,
}

impl StashOutcome {
  /// Classify the stdout of `git stash`
  pub fn from_output(output: &str) -> Self {
    if NO_LOCAL_CHANGES.is_match(output) {
      StashOutcome::NothingToSave
    } else {
      StashOutcome::Saved
    }
  }
}

/// Higher-level git operations used by tasks and the release pipeline
pub trait GitOps: GitBridge {
  /// Stash uncommitted changes
  fn stash(&self) -> ShipResult<StashOutcome> {
    let output = self.run(&["stash"])?;
    Ok(StashOutcome::from_output(&output))
  }

  /// Restore the most recent stash
  fn stash_pop(&self) -> ShipResult<()> {
    self.run(&["stash", "pop"])?;
    Ok(())
  }

  /// Pull `branch` from `remote`
  fn pull(&self, remote: &str, branch: &str) -> ShipResult<()> {
    self.run(&["pull", remote, branch])?;
    Ok(())
  }

  /// Stage paths
  fn add(&self, paths: &[&str]) -> ShipResult<()> {
    let mut args = vec!["add"];
    args.extend_from_slice(paths);
    self.run(&args)?;
    Ok(())
  }

  /// Commit staged changes
  fn commit(&self, message: &str) -> ShipResult<()> {
    self.run(&["commit", "-m", message])?;
    Ok(())
  }

  /// Create an annotated tag on HEAD
  fn tag_annotated(&self, name: &str, message: &str) -> ShipResult<()> {
    self.run(&["tag", "-a", name, "-m", message])?;
    Ok(())
  }

  /// Push a branch or tag to a remote
  fn push(&self, remote: &str, refname: &str) -> ShipResult<()> {
    self.run(&["push", remote, refname]).map_err(|err| match err {
      ShipError::Git(GitError::CommandFailed { stderr, .. }) => ShipError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refname: refname.to_string(),
        reason: stderr,
      }),
      other => other,
    })?;
    Ok(())
  }

  /// Push a directory as a squashed subtree onto `branch`
  fn subtree_push(&self, prefix: &str, remote: &str, branch: &str) -> ShipResult<()> {
    self.run(&["subtree", "push", "--squash", "--prefix", prefix, remote, branch])?;
    Ok(())
  }

  /// Most recent tag reachable from HEAD, if any
  fn latest_tag(&self) -> ShipResult<Option<String>> {
    match self.run(&["describe", "--tags", "--abbrev=0"]) {
      Ok(output) => {
        let tag = output.trim();
        Ok((!tag.is_empty()).then(|| tag.to_string()))
      }
      // No tags yet (or no commits): changelog starts from the beginning
      Err(ShipError::Git(GitError::CommandFailed { .. })) => Ok(None),
      Err(other) => Err(other),
    }
  }

  /// Commits in `from..to` (or all of `to` when `from` is None), newest first
  fn log_range(&self, from: Option<&str>, to: &str) -> ShipResult<Vec<CommitInfo>> {
    let range = match from {
      Some(from) => format!("{}..{}", from, to),
      None => to.to_string(),
    };
    let format = format!("--format=%H{}%B{}", FIELD_SEP, RECORD_SEP);
    let output = self.run(&["log", &format, &range])?;
    Ok(parse_log_output(&output))
  }
}

impl<G: GitBridge + ?Sized> GitOps for G {}

/// Parse `git log --format=%H<US>%B<RS>` output
fn parse_log_output(output: &str) -> Vec<CommitInfo> {
  output
    .split(RECORD_SEP)
    .filter_map(|record| {
      let record = record.trim_start_matches('\n');
      let (sha, message) = record.split_once(FIELD_SEP)?;
      let sha = sha.trim();
      if sha.is_empty() {
        return None;
      }
      Some(CommitInfo {
        sha: sha.to_string(),
        message: message.trim().to_string(),
      })
    })
    .collect()
}
