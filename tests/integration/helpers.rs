//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Manifest every test project starts from
pub const PACKAGE_JSON: &str = r#"{
  "name": "widget",
  "version": "1.2.3",
  "repository": {
    "type": "git",
    "url": "git+https://github.com/acme/widget.git"
  }
}
"#;

/// Config with harmless test/document commands and no API delay
pub const SHIPRAIL_TOML: &str = r#"[git]
remote = "origin"
branch = "main"

[release]
api_delay_ms = 0

[tasks.test]
run = ["git", "--version"]

[tasks.document]
run = ["git", "--version"]
"#;

/// A temporary project with a bare `origin` remote
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  pub origin: PathBuf,
}

impl TestProject {
  /// Project at version 1.2.3 with a pushed history and a `v1.2.3` tag
  pub fn new() -> Result<Self> {
    Self::with_config(SHIPRAIL_TOML)
  }

  pub fn with_config(config: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("widget");
    let origin = root.path().join("origin.git");
    fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "origin.git"])?;
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;
    git(&path, &["config", "pull.rebase", "false"])?;
    git(&path, &["remote", "add", "origin", &origin.to_string_lossy()])?;

    let project = Self {
      _root: root,
      path,
      origin,
    };

    project.write_file("package.json", PACKAGE_JSON)?;
    project.write_file("shiprail.toml", config)?;
    project.write_file("README.md", "# widget\n")?;
    project.commit("chore: initial import")?;
    git(&project.path, &["tag", "-a", "v1.2.3", "-m", "v1.2.3"])?;
    git(&project.path, &["push", "-u", "origin", "main", "--tags"])?;

    Ok(project)
  }

  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    let full = self.path.join(rel);
    if let Some(parent) = full.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&full, content).with_context(|| format!("Failed to write {}", rel))
  }

  pub fn read_file(&self, rel: &str) -> Result<String> {
    fs::read_to_string(self.path.join(rel)).with_context(|| format!("Failed to read {}", rel))
  }

  pub fn file_exists(&self, rel: &str) -> bool {
    self.path.join(rel).exists()
  }

  /// Stage everything and commit
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "-A"])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Commit an empty change with a conventional message
  pub fn commit_empty(&self, message: &str) -> Result<()> {
    git(&self.path, &["commit", "--allow-empty", "-m", message])?;
    Ok(())
  }

  /// Version field of package.json
  pub fn manifest_version(&self) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(&self.read_file("package.json")?)?;
    value["version"]
      .as_str()
      .map(str::to_string)
      .context("package.json has no version")
  }

  /// Subject of the HEAD commit
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tags present in the bare remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.origin, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect(),
    )
  }

  pub fn local_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect(),
    )
  }
}

/// Run a git command, failing on a non-zero exit
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

  if !output.status.success() {
    anyhow::bail!(
      "git {} failed:\n{}",
      args.join(" "),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

/// Run shiprail and fail unless it exits successfully
pub fn run_shiprail(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_shiprail_raw(cwd, args)?;

  if !output.status.success() {
    anyhow::bail!(
      "shiprail {} failed:\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

/// Run shiprail and return its output whatever the exit status
pub fn run_shiprail_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_shiprail"))
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run shiprail")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
