//! System git backend
//!
//! Every operation shells out to `git -C <repo>` with an isolated
//! environment. Output is decoded lossily; callers only see stdout.

use super::GitBridge;
use crate::core::error::{GitError, ShipError, ShipResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Output fragments that mean failure even when git exits 0.
///
/// `git stash pop` and `git pull` report conflicts this way on some versions.
const FAILURE_PATTERNS: &[&str] = &["CONFLICT ("];

/// Environment variables passed through to git
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "SSH_AUTH_SOCK",
  "GIT_SSH_COMMAND",
];

/// Git backend using system git
pub struct SystemGit {
  /// Working directory every command runs in
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> ShipResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ShipError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ShipError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables except the passthrough list
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    for key in PASSTHROUGH_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }
    // Never block on an editor or a credential prompt
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("GIT_EDITOR", "true");

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}

impl GitBridge for SystemGit {
  fn run(&self, args: &[&str]) -> ShipResult<String> {
    let command = format!("git {}", args.join(" "));
    debug!(%command, repo = %self.repo_path.display(), "running git");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
      debug!(%command, code = ?output.status.code(), "git failed");
      return Err(ShipError::Git(GitError::CommandFailed {
        command,
        stderr: if stderr.trim().is_empty() { stdout } else { stderr },
      }));
    }

    if let Some(pattern) = detect_failure(&stdout).or_else(|| detect_failure(&stderr)) {
      debug!(%command, pattern, "git output matched a failure pattern");
      return Err(ShipError::Git(GitError::CommandFailed {
        command,
        stderr: format!("{}{}", stdout, stderr),
      }));
    }

    Ok(stdout)
  }
}

/// Return the first failure pattern contained in `output`
fn detect_failure(output: &str) -> Option<&'static str> {
  FAILURE_PATTERNS.iter().copied().find(|pattern| output.contains(pattern))
}
