//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let out = stdout(&run_shiprail(dir.path(), &["init"])?);
  assert!(out.contains("shiprail.toml"));

  let config = std::fs::read_to_string(dir.path().join("shiprail.toml"))?;
  assert!(config.contains("[git]"));
  assert!(config.contains("[tasks.test]"));

  Ok(())
}

#[test]
fn test_init_refuses_existing_config() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_shiprail_raw(&project.path, &["init"])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(project.read_file("shiprail.toml")?, SHIPRAIL_TOML);

  Ok(())
}

#[test]
fn test_init_force_overwrites() -> Result<()> {
  let project = TestProject::new()?;

  run_shiprail(&project.path, &["init", "--force"])?;
  let config = project.read_file("shiprail.toml")?;
  assert!(config.starts_with("# shiprail configuration"));

  Ok(())
}
