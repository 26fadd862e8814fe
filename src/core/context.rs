//! Project context - built once in main.rs, passed everywhere
//!
//! Replaces ambient process state (current directory, `$USER`, wall clock)
//! with explicit values so the release pipeline can run against fakes.

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use crate::core::vcs::{GitBridge, SystemGit};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Timestamp source and sleep
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
  fn sleep(&self, duration: Duration);
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }

  fn sleep(&self, duration: Duration) {
    std::thread::sleep(duration);
  }
}

/// Everything a task or release step needs to know about the project.
///
/// Cheap to clone: the shared parts sit behind `Arc`.
#[derive(Clone)]
pub struct ProjectContext {
  /// Working tree root (absolute path)
  pub root: PathBuf,

  /// Who is cutting the release, resolved once at startup
  pub actor: String,

  pub clock: Arc<dyn Clock>,

  pub git: Arc<dyn GitBridge>,

  /// shiprail.toml (defaults when absent)
  pub config: Arc<ShipConfig>,
}

impl ProjectContext {
  /// Build the context for the repository containing `dir`
  pub fn build(dir: &Path) -> ShipResult<Self> {
    let git = SystemGit::open(dir)?;
    let root = git.work_tree().to_path_buf();
    let config = ShipConfig::load(&root)?;

    Ok(Self {
      root,
      actor: resolve_actor(),
      clock: Arc::new(SystemClock),
      git: Arc::new(git),
      config: Arc::new(config),
    })
  }

  /// Assemble a context from explicit parts
  #[cfg(test)]
  pub fn with_parts(
    root: PathBuf,
    actor: impl Into<String>,
    clock: Arc<dyn Clock>,
    git: Arc<dyn GitBridge>,
    config: ShipConfig,
  ) -> Self {
    Self {
      root,
      actor: actor.into(),
      clock,
      git,
      config: Arc::new(config),
    }
  }

  /// Resolve a project-relative path
  pub fn path(&self, relative: &Path) -> PathBuf {
    self.root.join(relative)
  }
}

/// `$USER`, then `$USERNAME`, then "unknown"
fn resolve_actor() -> String {
  ["USER", "USERNAME"]
    .iter()
    .filter_map(|key| std::env::var(key).ok())
    .find(|value| !value.trim().is_empty())
    .unwrap_or_else(|| "unknown".to_string())
}


#[cfg(test)]
mod tests {
  use super::testing::FakeClock;
  use super::*;
  use crate::core::vcs::fake::FakeGit;

  #[test]
  fn test_fake_clock_records_sleep() {
    let clock = FakeClock::at("2026-10-16T12:00:00Z");
    clock.sleep(Duration::from_millis(1500));
    clock.sleep(Duration::from_millis(500));
    assert_eq!(clock.total_slept(), Duration::from_secs(2));
    assert_eq!(clock.now().to_rfc3339(), "2026-10-16T12:00:00+00:00");
  }

  #[test]
  fn test_with_parts_resolves_paths() {
    let ctx = ProjectContext::with_parts(
      PathBuf::from("/work/widget"),
      "alice",
      Arc::new(FakeClock::at("2026-10-16T12:00:00Z")),
      Arc::new(FakeGit::new()),
      ShipConfig::default(),
    );
    assert_eq!(ctx.path(Path::new("CHANGELOG.md")), PathBuf::from("/work/widget/CHANGELOG.md"));
    assert_eq!(ctx.actor, "alice");
  }

  #[test]
  fn test_resolve_actor_never_empty() {
    assert!(!resolve_actor().is_empty());
  }
}
