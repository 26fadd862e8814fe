use crate::core::error::{ConfigError, ShipError, ShipResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wait before calling the release API so the freshly pushed tag is visible
pub const DEFAULT_RELEASE_API_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for `release.api_delay_ms`
const MAX_API_DELAY_MS: u64 = 60_000;

/// Manifests checked when `project.manifest` is unset, in order
const MANIFEST_CANDIDATES: &[&str] = &["package.json", "Cargo.toml"];

/// Configuration for shiprail
/// Searched in order: shiprail.toml, .shiprail.toml, .config/shiprail.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipConfig {
  #[serde(default)]
  pub project: ProjectConfig,
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub site: SiteConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  /// Task overrides and additions, keyed by task name
  #[serde(default)]
  pub tasks: BTreeMap<String, TaskConfig>,
}

/// Project files the release pipeline reads and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Manifest holding `version` and the repository URL (package.json or Cargo.toml)
  #[serde(default)]
  pub manifest: Option<PathBuf>,

  /// Changelog file, fully rewritten on each release
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// File holding a GitHub token; its presence enables GitHub releases
  #[serde(default = "default_credential_file")]
  pub credential_file: PathBuf,
}

fn default_changelog() -> PathBuf {
  PathBuf::from("CHANGELOG.md")
}

fn default_credential_file() -> PathBuf {
  PathBuf::from(".github-api-token")
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      manifest: None,
      changelog: default_changelog(),
      credential_file: default_credential_file(),
    }
  }
}

impl ProjectConfig {
  /// Resolve the manifest path (relative to the project root)
  ///
  /// Uses the configured path, else the first candidate that exists,
  /// else `package.json` so the error names a sensible file.
  pub fn manifest_path(&self, root: &Path) -> PathBuf {
    if let Some(ref manifest) = self.manifest {
      return manifest.clone();
    }
    MANIFEST_CANDIDATES
      .iter()
      .map(PathBuf::from)
      .find(|candidate| root.join(candidate).exists())
      .unwrap_or_else(|| PathBuf::from(MANIFEST_CANDIDATES[0]))
  }
}

/// Remote and branch names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  #[serde(default = "default_remote")]
  pub remote: String,
  /// Branch pulled before and pushed after a release
  #[serde(default = "default_branch")]
  pub branch: String,
  /// Branch receiving the published site
  #[serde(default = "default_pages_branch")]
  pub pages_branch: String,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_branch() -> String {
  "main".to_string()
}

fn default_pages_branch() -> String {
  "gh-pages".to_string()
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      branch: default_branch(),
      pages_branch: default_pages_branch(),
    }
  }
}

/// Static site output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
  /// Output directory cleaned by `clean` and published by `site:publish`
  #[serde(default = "default_dist")]
  pub dist: PathBuf,
}

fn default_dist() -> PathBuf {
  PathBuf::from("docs/dist")
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self { dist: default_dist() }
  }
}

/// How to log a `201 Created` answer from the release API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreatedStatus {
  /// 201 means the release was created
  #[default]
  Success,
  /// Log "Failed to create release tag" on 201 and carry on
  LegacyWarning,
}

/// GitHub release settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Repository owner (default: parsed from the manifest repository URL)
  #[serde(default)]
  pub owner: Option<String>,

  /// Repository name (default: parsed from the manifest repository URL)
  #[serde(default)]
  pub repo: Option<String>,

  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Override for [`DEFAULT_RELEASE_API_DELAY`], in milliseconds
  #[serde(default)]
  pub api_delay_ms: Option<u64>,

  #[serde(default)]
  pub created_status: CreatedStatus,
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      owner: None,
      repo: None,
      api_url: default_api_url(),
      api_delay_ms: None,
      created_status: CreatedStatus::default(),
    }
  }
}

impl ReleaseConfig {
  /// Delay before the release API call
  pub fn api_delay(&self) -> Duration {
    self
      .api_delay_ms
      .map(Duration::from_millis)
      .unwrap_or(DEFAULT_RELEASE_API_DELAY)
  }
}

/// A task override or user-defined task
///
/// ```toml
/// [tasks.test]
/// run = ["npm", "test"]
///
/// [tasks.lint]
/// description = "Lint sources"
/// run = ["cargo", "clippy", "--", "-D", "warnings"]
/// deps = ["clean"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
  #[serde(default)]
  pub description: Option<String>,
  /// Command and arguments; an empty list makes the task a no-op
  #[serde(default)]
  pub run: Option<Vec<String>>,
  /// Prerequisites that must succeed first
  #[serde(default)]
  pub deps: Option<Vec<String>>,
  /// Tasks run in order after the prerequisites
  #[serde(default)]
  pub sequence: Option<Vec<String>>,
}

impl ShipConfig {
  /// Find config file in search order: shiprail.toml, .shiprail.toml, .config/shiprail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("shiprail.toml"),
      path.join(".shiprail.toml"),
      path.join(".config").join("shiprail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ShipResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|message| {
      ShipError::Config(ConfigError::Parse {
        path: config_path.clone(),
        message,
      })
    })?;

    config.validate()?;
    Ok(config)
  }

  /// Parse TOML text without validating it
  pub fn parse(content: &str) -> Result<Self, String> {
    toml_edit::de::from_str(content).map_err(|e| e.to_string())
  }

  /// Reject values the pipeline cannot work with
  pub fn validate(&self) -> ShipResult<()> {
    if self.git.remote.trim().is_empty() {
      return Err(invalid("git.remote", "must not be empty"));
    }
    if self.git.branch.trim().is_empty() {
      return Err(invalid("git.branch", "must not be empty"));
    }
    if let Some(delay) = self.release.api_delay_ms
      && delay > MAX_API_DELAY_MS
    {
      return Err(invalid(
        "release.api_delay_ms",
        &format!("{} exceeds the maximum of {}", delay, MAX_API_DELAY_MS),
      ));
    }
    if self.site.dist.as_os_str().is_empty() || self.site.dist == Path::new(".") {
      return Err(invalid("site.dist", "must name a subdirectory"));
    }
    for (name, task) in &self.tasks {
      if name.trim().is_empty() {
        return Err(invalid("tasks", "task names must not be empty"));
      }
      if task.run.is_some() && task.sequence.is_some() {
        return Err(invalid(
          &format!("tasks.{}", name),
          "set either `run` or `sequence`, not both",
        ));
      }
    }
    Ok(())
  }
}

fn invalid(field: &str, reason: &str) -> ShipError {
  ShipError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}
