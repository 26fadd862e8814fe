//! Error types for shiprail with contextual messages and exit codes
//!
//! One error enum for the whole tool. Each category knows its exit code and,
//! where it can, a help line that points the user at a fix.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for shiprail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifest, invalid args)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Task graph or external task failure
  Task = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for shiprail
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Project manifest errors
  Manifest(ManifestError),

  /// Changelog generation errors
  Changelog(ChangelogError),

  /// Remote release (hosting API) errors
  RemoteRelease(RemoteReleaseError),

  /// Task graph errors
  Task(TaskError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Manifest(_) => ExitCode::User,
      ShipError::Changelog(_) => ExitCode::System,
      ShipError::RemoteRelease(_) => ExitCode::System,
      ShipError::Task(_) => ExitCode::Task,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Manifest(e) => e.help_message(),
      ShipError::RemoteRelease(e) => e.help_message(),
      ShipError::Task(e) => e.help_message(),
      ShipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Manifest(e) => write!(f, "{}", e),
      ShipError::Changelog(e) => write!(f, "{}", e),
      ShipError::RemoteRelease(e) => write!(f, "{}", e),
      ShipError::Task(e) => write!(f, "{}", e),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<GitError> for ShipError {
  fn from(err: GitError) -> Self {
    ShipError::Git(err)
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<ManifestError> for ShipError {
  fn from(err: ManifestError) -> Self {
    ShipError::Manifest(err)
  }
}

impl From<ChangelogError> for ShipError {
  fn from(err: ChangelogError) -> Self {
    ShipError::Changelog(err)
  }
}

impl From<RemoteReleaseError> for ShipError {
  fn from(err: RemoteReleaseError) -> Self {
    ShipError::RemoteRelease(err)
  }
}

impl From<TaskError> for ShipError {
  fn from(err: TaskError) -> Self {
    ShipError::Task(err)
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for ShipError {
  fn from(err: reqwest::Error) -> Self {
    ShipError::RemoteRelease(RemoteReleaseError::Transport {
      message: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// shiprail.toml could not be parsed
  Parse { path: PathBuf, message: String },

  /// A field holds a value shiprail cannot use
  Invalid { field: String, reason: String },

  /// Credential file exists but holds no token
  EmptyCredential { path: PathBuf },

  /// `shiprail init` would overwrite an existing config
  AlreadyExists { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => Some("Run `shiprail init --force` to regenerate a default configuration.".to_string()),
      ConfigError::EmptyCredential { path } => Some(format!(
        "Put a GitHub token in {} or delete the file to skip GitHub releases.",
        path.display()
      )),
      ConfigError::AlreadyExists { .. } => Some("Pass --force to overwrite it.".to_string()),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, message } => {
        write!(f, "Failed to parse config {}: {}", path.display(), message)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
      ConfigError::EmptyCredential { path } => {
        write!(f, "Credential file {} is empty", path.display())
      }
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration already exists: {}", path.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed (nonzero exit or a known failure pattern in its output)
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    refname: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("rejected") {
          Some("The remote has commits you don't have. Pull first, then re-run the release.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check your SSH key or credential helper for this remote.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run shiprail inside a git repository or pass -C <dir> (looked in {})",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("CONFLICT") {
          Some("Resolve the conflicts, commit, and re-run.".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, refname, reason } => {
        write!(f, "Push of {} to {} failed: {}", refname, remote, reason.trim_end())
      }
    }
  }
}

/// Project manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file missing
  NotFound { path: PathBuf },

  /// Manifest could not be parsed
  Parse { path: PathBuf, message: String },

  /// A required field is absent or has the wrong type
  MissingField { path: PathBuf, field: String },

  /// The version is not valid semver
  InvalidVersion { version: String, message: String },

  /// File name does not map to a known manifest format
  UnsupportedFormat { path: PathBuf },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::NotFound { .. } => {
        Some("Set `project.manifest` in shiprail.toml to your package.json or Cargo.toml.".to_string())
      }
      ManifestError::UnsupportedFormat { .. } => Some("Supported manifests are *.json and *.toml files.".to_string()),
      ManifestError::InvalidVersion { .. } => Some("Versions must follow semver, e.g. 1.2.3 or 1.2.3-rc.1".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { path } => write!(f, "Manifest not found: {}", path.display()),
      ManifestError::Parse { path, message } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), message)
      }
      ManifestError::MissingField { path, field } => {
        write!(f, "Manifest {} has no usable '{}' field", path.display(), field)
      }
      ManifestError::InvalidVersion { version, message } => {
        write!(f, "Invalid version '{}': {}", version, message)
      }
      ManifestError::UnsupportedFormat { path } => {
        write!(f, "Unsupported manifest format: {}", path.display())
      }
    }
  }
}

/// Changelog generation errors
#[derive(Debug)]
pub enum ChangelogError {
  /// Reading commit history failed
  History { range: String, reason: String },

  /// Reading or writing the changelog file failed
  Io { path: PathBuf, reason: String },
}

impl fmt::Display for ChangelogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangelogError::History { range, reason } => {
        write!(f, "Failed to read commit history for {}: {}", range, reason)
      }
      ChangelogError::Io { path, reason } => {
        write!(f, "Failed to update changelog {}: {}", path.display(), reason)
      }
    }
  }
}

/// Remote release (hosting API) errors
#[derive(Debug)]
pub enum RemoteReleaseError {
  /// Request never got a response
  Transport { message: String },

  /// API answered with a non-success status
  Rejected { status: u16, message: String },

  /// Owner/repo could not be determined
  UnknownRepository { url: Option<String> },
}

impl RemoteReleaseError {
  fn help_message(&self) -> Option<String> {
    match self {
      RemoteReleaseError::Rejected { status: 401, .. } => {
        Some("The token in the credential file was rejected. Generate a new one with `repo` scope.".to_string())
      }
      RemoteReleaseError::Rejected { status: 422, .. } => {
        Some("A release for this tag probably exists already.".to_string())
      }
      RemoteReleaseError::UnknownRepository { .. } => {
        Some("Set `release.owner` and `release.repo` in shiprail.toml.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RemoteReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteReleaseError::Transport { message } => write!(f, "Release API request failed: {}", message),
      RemoteReleaseError::Rejected { status, message } => {
        write!(f, "Release API rejected the request ({}): {}", status, message)
      }
      RemoteReleaseError::UnknownRepository { url: Some(url) } => {
        write!(f, "Cannot determine GitHub owner/repo from repository URL '{}'", url)
      }
      RemoteReleaseError::UnknownRepository { url: None } => {
        write!(f, "Cannot determine GitHub owner/repo: manifest has no repository URL")
      }
    }
  }
}

/// Task graph errors
#[derive(Debug)]
pub enum TaskError {
  /// Task name not defined
  Unknown {
    name: String,
    referenced_by: Option<String>,
  },

  /// Prerequisites form a cycle
  Cycle { tasks: Vec<String> },

  /// External command exited unsuccessfully
  CommandFailed {
    task: String,
    command: String,
    code: Option<i32>,
  },

  /// Task already failed earlier in this run
  PrerequisiteFailed { task: String },

  /// Release task reached again from its own verification tasks
  NestedRelease { task: String },
}

impl TaskError {
  fn help_message(&self) -> Option<String> {
    match self {
      TaskError::Unknown { .. } => Some("Run `shiprail tasks` to list the available tasks.".to_string()),
      TaskError::Cycle { .. } => Some("Remove one of the `deps` or `sequence` entries in shiprail.toml.".to_string()),
      TaskError::NestedRelease { .. } => {
        Some("Remove the release task from the `deps` of `test` and `document` in shiprail.toml.".to_string())
      }
      TaskError::CommandFailed { .. } | TaskError::PrerequisiteFailed { .. } => None,
    }
  }
}

impl fmt::Display for TaskError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TaskError::Unknown {
        name,
        referenced_by: Some(parent),
      } => write!(f, "Task '{}' (required by '{}') is not defined", name, parent),
      TaskError::Unknown {
        name,
        referenced_by: None,
      } => write!(f, "Task '{}' is not defined", name),
      TaskError::Cycle { tasks } => write!(f, "Task dependency cycle: {}", tasks.join(" → ")),
      TaskError::CommandFailed { task, command, code } => match code {
        Some(code) => write!(f, "Task '{}' failed: `{}` exited with code {}", task, command, code),
        None => write!(f, "Task '{}' failed: `{}` was terminated by a signal", task, command),
      },
      TaskError::PrerequisiteFailed { task } => write!(f, "Task '{}' failed earlier in this run", task),
      TaskError::NestedRelease { task } => write!(f, "Task '{}' cannot run while verifying a release", task),
    }
  }
}

/// Result type alias for shiprail
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
