//! Integration tests for `shiprail release` and `shiprail tag`

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_release_patch_end_to_end() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_empty("feat(ui): add button")?;
  project.commit_empty("fix(core): stop crash on empty input\n\nCloses #12")?;
  git(&project.path, &["push", "origin", "main"])?;

  let output = run_shiprail(&project.path, &["release", "--patch"])?;
  let out = stdout(&output);
  assert!(out.contains("Tagged v1.2.4"), "stdout: {}", out);
  assert!(out.contains("GitHub release skipped"));

  assert_eq!(project.manifest_version()?, "1.2.4");
  assert_eq!(project.head_subject()?, "chore(release): v1.2.4");
  assert!(project.remote_tags()?.contains(&"v1.2.4".to_string()));

  let changelog = project.read_file("CHANGELOG.md")?;
  assert!(changelog.starts_with("<a name=\"1.2.4\"></a>"));
  assert!(changelog.contains("### 1.2.4 ("));
  assert!(changelog.contains("#### Features"));
  assert!(changelog.contains("* **ui:** add button"));
  assert!(changelog.contains("#### Bug Fixes"));
  assert!(changelog.contains("closes [#12](https://github.com/acme/widget/issues/12)"));
  assert!(!changelog.contains("initial import"));

  Ok(())
}

#[test]
fn test_release_restores_local_changes() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_empty("feat: widgets")?;
  git(&project.path, &["push", "origin", "main"])?;
  project.write_file("README.md", "# widget\n\nwork in progress\n")?;

  let output = run_shiprail(&project.path, &["release"])?;
  assert!(stdout(&output).contains("Restored stashed changes"));

  assert_eq!(project.read_file("README.md")?, "# widget\n\nwork in progress\n");
  let committed = git(&project.path, &["show", "--name-only", "--format=", "HEAD"])?;
  let files = String::from_utf8_lossy(&committed.stdout).to_string();
  assert!(files.contains("package.json"));
  assert!(files.contains("CHANGELOG.md"));
  assert!(!files.contains("README.md"));

  Ok(())
}

#[test]
fn test_release_pull_failure_restores_and_aborts() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("README.md", "# widget\n\nlocal edit\n")?;
  git(&project.path, &["remote", "set-url", "origin", "/nonexistent/origin.git"])?;

  let output = run_shiprail_raw(&project.path, &["release"])?;
  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));

  assert_eq!(project.read_file("README.md")?, "# widget\n\nlocal edit\n");
  assert_eq!(project.manifest_version()?, "1.2.3");
  assert!(!project.local_tags()?.contains(&"v1.2.4".to_string()));
  assert!(!project.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_release_failing_tests_abort_before_tagging() -> Result<()> {
  let config = SHIPRAIL_TOML.replace(
    "[tasks.test]\nrun = [\"git\", \"--version\"]",
    "[tasks.test]\nrun = [\"git\", \"definitely-not-a-subcommand\"]",
  );
  let project = TestProject::with_config(&config)?;
  project.write_file("README.md", "# widget\n\ndirty\n")?;

  let output = run_shiprail_raw(&project.path, &["release", "--minor"])?;
  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));

  assert_eq!(project.head_subject()?, "chore: initial import");
  assert_eq!(project.manifest_version()?, "1.2.3");
  assert_eq!(project.read_file("README.md")?, "# widget\n\ndirty\n");

  Ok(())
}

#[test]
fn test_tag_minor_with_label() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_empty("perf: faster rendering")?;

  run_shiprail(&project.path, &["tag", "--minor", "--label", "Hydrogen"])?;

  assert_eq!(project.manifest_version()?, "1.3.0");
  let changelog = project.read_file("CHANGELOG.md")?;
  assert!(changelog.contains("### 1.3.0 ("));
  assert!(changelog.contains("\"Hydrogen\""));
  assert!(changelog.contains("#### Performance Improvements"));
  assert!(project.remote_tags()?.contains(&"v1.3.0".to_string()));

  let message = git(&project.path, &["tag", "-l", "--format=%(contents)", "v1.3.0"])?;
  assert!(String::from_utf8_lossy(&message.stdout).starts_with("Release tagged by "));

  Ok(())
}

#[test]
fn test_tag_prepends_to_existing_changelog() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("CHANGELOG.md", "<a name=\"1.2.3\"></a>\n### 1.2.3 (2024-01-01)\n\n* older entry\n")?;
  project.commit("docs: seed changelog")?;
  project.commit_empty("feat: second feature")?;

  run_shiprail(&project.path, &["tag", "--prerelease"])?;

  assert_eq!(project.manifest_version()?, "1.2.4-0");
  let changelog = project.read_file("CHANGELOG.md")?;
  let newest = changelog.find("### 1.2.4-0 (").expect("new heading");
  let older = changelog.find("### 1.2.3 (").expect("old heading");
  assert!(newest < older);
  assert!(changelog.contains("* older entry"));

  Ok(())
}
