//! Integration tests for `shiprail tasks` and `shiprail run`

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_tasks_lists_builtins() -> Result<()> {
  let project = TestProject::new()?;

  let out = stdout(&run_shiprail(&project.path, &["tasks"])?);
  for name in ["clean", "document", "site", "site:publish", "test", "release", "release:tag"] {
    assert!(out.contains(name), "missing {} in:\n{}", name, out);
  }

  Ok(())
}

#[test]
fn test_tasks_json_is_parseable() -> Result<()> {
  let project = TestProject::new()?;

  let out = stdout(&run_shiprail(&project.path, &["tasks", "--json"])?);
  let tasks: serde_json::Value = serde_json::from_str(&out)?;
  let release = tasks
    .as_array()
    .and_then(|all| all.iter().find(|t| t["name"] == "release"))
    .expect("release task listed");
  assert_eq!(release["action"]["kind"], "release");

  Ok(())
}

#[test]
fn test_run_site_cleans_then_builds_in_order() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("docs/dist/stale.html", "old")?;

  let out = stdout(&run_shiprail(&project.path, &["run", "site"])?);

  assert!(!project.file_exists("docs/dist/stale.html"));
  assert!(project.file_exists("docs/dist"));

  let started: Vec<&str> = out
    .lines()
    .filter_map(|line| line.strip_prefix("▶️  "))
    .collect();
  assert_eq!(started, ["clean", "document", "static-pages", "static-assets", "site"]);

  Ok(())
}

#[test]
fn test_run_shared_prerequisite_runs_once() -> Result<()> {
  let project = TestProject::new()?;

  let out = stdout(&run_shiprail(&project.path, &["run", "site", "clean"])?);
  let cleans = out.lines().filter(|line| *line == "▶️  clean").count();
  assert_eq!(cleans, 1);

  Ok(())
}

#[test]
fn test_run_unknown_task_fails() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_shiprail_raw(&project.path, &["run", "deploy"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("deploy"));

  Ok(())
}

#[test]
fn test_config_cycle_is_rejected() -> Result<()> {
  let config = format!(
    "{}\n[tasks.lint]\ndeps = [\"fmt\"]\n\n[tasks.fmt]\ndeps = [\"lint\"]\n",
    SHIPRAIL_TOML
  );
  let project = TestProject::with_config(&config)?;

  let output = run_shiprail_raw(&project.path, &["run", "test"])?;
  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("lint") && err.contains("fmt"), "stderr: {}", err);

  Ok(())
}

#[test]
fn test_outside_repository_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let output = run_shiprail_raw(dir.path(), &["tasks"])?;
  assert_eq!(output.status.code(), Some(2));

  Ok(())
}
