//! Site output: clean and publish to the pages branch

use crate::core::context::ProjectContext;
use crate::core::error::{GitError, ShipError, ShipResult, ResultExt};
use crate::core::vcs::GitOps;
use crate::utils::path_to_git_format;
use std::fs;
use std::path::{Component, Path};
use tracing::info;

pub const PUBLISH_COMMIT_MESSAGE: &str = "chore(gh-pages): publish GitHub pages";

/// Refuse output directories that escape the project
fn check_dist(dist: &Path) -> ShipResult<()> {
  let escapes = dist.is_absolute()
    || dist
      .components()
      .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
  if escapes || dist.components().all(|c| matches!(c, Component::CurDir)) {
    return Err(ShipError::with_help(
      format!("Refusing to use site output directory '{}'", dist.display()),
      "Set `site.dist` to a directory inside the project, e.g. docs/dist",
    ));
  }
  Ok(())
}

/// Remove everything inside the site output directory, keeping the directory
pub fn clean(ctx: &ProjectContext) -> ShipResult<()> {
  let dist = &ctx.config.site.dist;
  check_dist(dist)?;
  let path = ctx.path(dist);

  if !path.exists() {
    info!(path = %path.display(), "site output directory absent, nothing to clean");
    return Ok(());
  }

  let entries = fs::read_dir(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  let mut removed = 0usize;
  for entry in entries {
    let entry = entry?;
    let entry_path = entry.path();
    let result = if entry.file_type()?.is_dir() {
      fs::remove_dir_all(&entry_path)
    } else {
      fs::remove_file(&entry_path)
    };
    result.with_context(|| format!("Failed to remove {}", entry_path.display()))?;
    removed += 1;
  }

  println!("🧹 Cleaned {} ({} entries)", dist.display(), removed);
  Ok(())
}

/// Commit the site output and subtree-push it to the pages branch
pub fn publish(ctx: &ProjectContext) -> ShipResult<()> {
  let dist = &ctx.config.site.dist;
  check_dist(dist)?;
  let prefix = path_to_git_format(dist);
  let git = ctx.git.as_ref();

  git.add(&[prefix.as_str()])?;
  match git.commit(PUBLISH_COMMIT_MESSAGE) {
    Ok(()) => {}
    // Unchanged output: push what is already committed
    Err(ShipError::Git(GitError::CommandFailed { stderr, .. })) if stderr.contains("nothing to commit") => {
      info!("site output unchanged, nothing to commit");
    }
    Err(err) => return Err(err),
  }

  let git_config = &ctx.config.git;
  git.subtree_push(&prefix, &git_config.remote, &git_config.pages_branch)?;
  println!(
    "🌐 Published {} to {}/{}",
    prefix, git_config.remote, git_config.pages_branch
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::ShipConfig;
  use crate::core::context::testing::FakeClock;
  use crate::core::vcs::fake::FakeGit;
  use std::path::PathBuf;
  use std::sync::Arc;
  use tempfile::TempDir;

  fn ctx(dir: &TempDir, git: Arc<FakeGit>, config: ShipConfig) -> ProjectContext {
    ProjectContext::with_parts(
      dir.path().to_path_buf(),
      "alice",
      Arc::new(FakeClock::at("2026-10-16T08:30:00Z")),
      git,
      config,
    )
  }

  #[test]
  fn test_clean_keeps_directory() {
    let dir = TempDir::new().unwrap();
    let dist = dir.path().join("docs/dist");
    fs::create_dir_all(dist.join("assets")).unwrap();
    fs::write(dist.join("index.html"), "<html>").unwrap();
    fs::write(dist.join("assets/app.js"), "").unwrap();

    clean(&ctx(&dir, Arc::new(FakeGit::new()), ShipConfig::default())).unwrap();
    assert!(dist.exists());
    assert_eq!(fs::read_dir(&dist).unwrap().count(), 0);
  }

  #[test]
  fn test_clean_missing_directory() {
    let dir = TempDir::new().unwrap();
    clean(&ctx(&dir, Arc::new(FakeGit::new()), ShipConfig::default())).unwrap();
  }

  #[test]
  fn test_dist_must_stay_inside_project() {
    let dir = TempDir::new().unwrap();
    for bad in ["..", "../site", "/tmp/site", "."] {
      let mut config = ShipConfig::default();
      config.site.dist = PathBuf::from(bad);
      assert!(clean(&ctx(&dir, Arc::new(FakeGit::new()), config)).is_err(), "{}", bad);
    }
  }

  #[test]
  fn test_publish_commands() {
    let dir = TempDir::new().unwrap();
    let git = Arc::new(FakeGit::new());
    publish(&ctx(&dir, git.clone(), ShipConfig::default())).unwrap();
    assert_eq!(
      git.calls(),
      vec![
        "add docs/dist",
        "commit -m chore(gh-pages): publish GitHub pages",
        "subtree push --squash --prefix docs/dist origin gh-pages",
      ]
    );
  }

  #[test]
  fn test_publish_with_nothing_to_commit() {
    let dir = TempDir::new().unwrap();
    let git = Arc::new(FakeGit::new().fail("commit", "nothing to commit, working tree clean"));
    publish(&ctx(&dir, git.clone(), ShipConfig::default())).unwrap();
    assert!(git.ran("subtree push"));
  }

  #[test]
  fn test_publish_push_failure() {
    let dir = TempDir::new().unwrap();
    let git = Arc::new(FakeGit::new().fail("subtree", "fatal: could not read from remote"));
    assert!(publish(&ctx(&dir, git, ShipConfig::default())).is_err());
  }
}
