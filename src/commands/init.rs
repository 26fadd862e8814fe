use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::ShipConfig;
use crate::core::error::{ConfigError, ShipError, ShipResult};

/// Written by `shiprail init`; every value shown is the default
pub const CONFIG_TEMPLATE: &str = r#"# shiprail configuration

[project]
# manifest = "package.json"      # default: package.json, then Cargo.toml
changelog = "CHANGELOG.md"
credential_file = ".github-api-token"

[git]
remote = "origin"
branch = "main"
pages_branch = "gh-pages"

[site]
dist = "docs/dist"

[release]
# owner = "acme"                 # default: from the manifest repository URL
# repo = "widget"
api_url = "https://api.github.com"
# api_delay_ms = 2000
created_status = "success"       # or "legacy-warning"

[tasks.test]
run = ["cargo", "test"]

[tasks.document]
run = ["cargo", "doc", "--no-deps"]

# [tasks.static-pages]
# run = ["npm", "run", "pages"]

# [tasks.static-assets]
# run = ["npm", "run", "assets"]
"#;

/// Run the init command to write a default shiprail.toml
pub fn run_init(dir: &Path, force: bool) -> ShipResult<PathBuf> {
  let path = match ShipConfig::find_config_path(dir) {
    Some(existing) if !force => {
      return Err(ShipError::Config(ConfigError::AlreadyExists { path: existing }));
    }
    Some(existing) => {
      println!("⚠️  Overwriting {}", existing.display());
      existing
    }
    None => dir.join("shiprail.toml"),
  };

  fs::write(&path, CONFIG_TEMPLATE)?;
  println!("✅ Wrote {}", path.display());

  let credential = dir.join(".github-api-token");
  if !credential.exists() {
    println!("💡 Put a GitHub token in {} to create GitHub releases", credential.display());
  }

  Ok(path)
}
