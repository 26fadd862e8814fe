//! Scripted git bridge for unit tests

use super::GitBridge;
use crate::core::error::{GitError, ShipError, ShipResult};
use std::sync::Mutex;

/// Records every command and answers from a script.
///
/// A script entry matches when the joined command line starts with its
/// prefix; the longest matching prefix wins. Unscripted commands succeed
/// with empty output.
#[derive(Default)]
pub struct FakeGit {
  script: Vec<(String, Result<String, String>)>,
  calls: Mutex<Vec<String>>,
}

impl FakeGit {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer commands starting with `prefix` with `stdout`
  pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
    self.script.push((prefix.to_string(), Ok(stdout.to_string())));
    self
  }

  /// Fail commands starting with `prefix` with `stderr`
  pub fn fail(mut self, prefix: &str, stderr: &str) -> Self {
    self.script.push((prefix.to_string(), Err(stderr.to_string())));
    self
  }

  /// Every command run so far, joined with spaces
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  /// Whether any recorded command starts with `prefix`
  pub fn ran(&self, prefix: &str) -> bool {
    self.calls().iter().any(|c| c.starts_with(prefix))
  }
}

impl GitBridge for FakeGit {
  fn run(&self, args: &[&str]) -> ShipResult<String> {
    let line = args.join(" ");
    self.calls.lock().unwrap().push(line.clone());

    let entry = self
      .script
      .iter()
      .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
      .max_by_key(|(prefix, _)| prefix.len());

    match entry {
      Some((_, Ok(stdout))) => Ok(stdout.clone()),
      Some((_, Err(stderr))) => Err(ShipError::Git(GitError::CommandFailed {
        command: format!("git {}", line),
        stderr: stderr.clone(),
      })),
      None => Ok(String::new()),
    }
  }
}
