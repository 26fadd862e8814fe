//! External commands for command tasks

use crate::core::error::{ShipResult, ResultExt, TaskError};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Run `argv` in `cwd` with inherited stdio
///
/// An empty `argv` is a no-op: the command is simply not configured.
pub fn run_command(task: &str, argv: &[String], cwd: &Path) -> ShipResult<()> {
  let Some((program, args)) = argv.split_first() else {
    warn!(task, "no command configured, skipping");
    return Ok(());
  };

  let command_line = argv.join(" ");
  debug!(task, command = %command_line, cwd = %cwd.display(), "running task command");

  let status = Command::new(program)
    .args(args)
    .current_dir(cwd)
    .status()
    .with_context(|| format!("Failed to execute `{}` for task '{}'", command_line, task))?;

  if !status.success() {
    return Err(
      TaskError::CommandFailed {
        task: task.to_string(),
        command: command_line,
        code: status.code(),
      }
      .into(),
    );
  }

  Ok(())
}
