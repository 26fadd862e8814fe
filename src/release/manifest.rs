//! Project manifest (package.json or Cargo.toml) access
//!
//! Only two fields matter to the release pipeline: the version and the
//! repository URL. Writes keep everything else intact: JSON keeps its key
//! order, TOML keeps formatting and comments.

use crate::core::error::{ManifestError, ShipError, ShipResult};
use crate::release::bump::parse_version;
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, value};

enum Document {
  Json(serde_json::Value),
  Toml(DocumentMut),
}

/// A loaded manifest
pub struct Manifest {
  path: PathBuf,
  doc: Document,
  version: Version,
}

impl Manifest {
  /// Load and parse the manifest at `path`
  pub fn load(path: &Path) -> ShipResult<Self> {
    if !path.exists() {
      return Err(ShipError::Manifest(ManifestError::NotFound {
        path: path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(path)?;
    let parse_err = |message: String| {
      ShipError::Manifest(ManifestError::Parse {
        path: path.to_path_buf(),
        message,
      })
    };

    let doc = match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Document::Json(serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?),
      Some("toml") => Document::Toml(content.parse::<DocumentMut>().map_err(|e| parse_err(e.to_string()))?),
      _ => {
        return Err(ShipError::Manifest(ManifestError::UnsupportedFormat {
          path: path.to_path_buf(),
        }));
      }
    };

    let raw_version = match &doc {
      Document::Json(json) => json.get("version").and_then(|v| v.as_str()),
      Document::Toml(toml) => toml.get("package").and_then(|p| p.get("version")).and_then(|v| v.as_str()),
    }
    .ok_or_else(|| {
      ShipError::Manifest(ManifestError::MissingField {
        path: path.to_path_buf(),
        field: "version".to_string(),
      })
    })?;
    let version = parse_version(raw_version)?;

    Ok(Self {
      path: path.to_path_buf(),
      doc,
      version,
    })
  }

  pub fn version(&self) -> &Version {
    &self.version
  }

  /// Repository URL as written in the manifest (not normalized)
  ///
  /// JSON accepts both `"repository": "url"` and `"repository": {"url": ...}`.
  pub fn repository_url(&self) -> Option<String> {
    match &self.doc {
      Document::Json(json) => match json.get("repository")? {
        serde_json::Value::String(url) => Some(url.clone()),
        serde_json::Value::Object(obj) => obj.get("url")?.as_str().map(str::to_string),
        _ => None,
      },
      Document::Toml(toml) => toml
        .get("package")?
        .get("repository")?
        .as_str()
        .map(str::to_string),
    }
  }

  /// Repository URL, or a `MissingField` error when absent
  pub fn require_repository_url(&self) -> ShipResult<String> {
    self.repository_url().ok_or_else(|| {
      ShipError::Manifest(ManifestError::MissingField {
        path: self.path.clone(),
        field: "repository".to_string(),
      })
    })
  }

  /// Update the version in memory; call [`Manifest::save`] to persist
  pub fn set_version(&mut self, version: &Version) {
    let text = version.to_string();
    match &mut self.doc {
      Document::Json(json) => {
        if let Some(obj) = json.as_object_mut() {
          obj.insert("version".to_string(), serde_json::Value::String(text));
        }
      }
      Document::Toml(toml) => {
        toml["package"]["version"] = value(text);
      }
    }
    self.version = version.clone();
  }

  /// Write the manifest back to disk
  pub fn save(&self) -> ShipResult<()> {
    let content = match &self.doc {
      Document::Json(json) => {
        let mut out = serde_json::to_string_pretty(json)?;
        out.push('\n');
        out
      }
      Document::Toml(toml) => toml.to_string(),
    };
    fs::write(&self.path, content)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn test_json_bump_preserves_key_order() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "package.json",
      r#"{"name": "widget", "version": "1.2.3", "repository": {"type": "git", "url": "git+https://github.com/acme/widget.git"}, "main": "index.js"}"#,
    );

    let mut manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.version().to_string(), "1.2.3");
    assert_eq!(
      manifest.repository_url().as_deref(),
      Some("git+https://github.com/acme/widget.git")
    );

    manifest.set_version(&Version::parse("1.2.4").unwrap());
    manifest.save().unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("}\n"));
    assert!(written.contains("  \"version\": \"1.2.4\""));
    let name_pos = written.find("\"name\"").unwrap();
    let version_pos = written.find("\"version\"").unwrap();
    let main_pos = written.find("\"main\"").unwrap();
    assert!(name_pos < version_pos && version_pos < main_pos);
  }

  #[test]
  fn test_json_string_repository() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "package.json", r#"{"version": "0.1.0", "repository": "github:acme/widget"}"#);
    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.repository_url().as_deref(), Some("github:acme/widget"));
  }

  #[test]
  fn test_toml_bump_preserves_comments() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "Cargo.toml",
      "# widget crate\n[package]\nname = \"widget\"\nversion = \"0.9.0\" # bumped by shiprail\nrepository = \"https://github.com/acme/widget\"\n",
    );

    let mut manifest = Manifest::load(&path).unwrap();
    manifest.set_version(&Version::parse("1.0.0").unwrap());
    manifest.save().unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# widget crate\n"));
    assert!(written.contains("version = \"1.0.0\""));
    assert_eq!(Manifest::load(&path).unwrap().version().to_string(), "1.0.0");
  }

  #[test]
  fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
      Manifest::load(&dir.path().join("package.json")),
      Err(ShipError::Manifest(ManifestError::NotFound { .. }))
    ));
  }

  #[test]
  fn test_missing_version_field() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "package.json", r#"{"name": "widget"}"#);
    match Manifest::load(&path) {
      Err(ShipError::Manifest(ManifestError::MissingField { field, .. })) => assert_eq!(field, "version"),
      other => panic!("expected MissingField, got {:?}", other.err()),
    }
  }

  #[test]
  fn test_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "package.json", "{ not json");
    assert!(matches!(
      Manifest::load(&path),
      Err(ShipError::Manifest(ManifestError::Parse { .. }))
    ));
  }

  #[test]
  fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "setup.py", "version = '1.0.0'");
    assert!(matches!(
      Manifest::load(&path),
      Err(ShipError::Manifest(ManifestError::UnsupportedFormat { .. }))
    ));
  }

  #[test]
  fn test_missing_repository_is_lazy() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "package.json", r#"{"version": "1.0.0"}"#);
    let manifest = Manifest::load(&path).unwrap();
    assert!(manifest.repository_url().is_none());
    assert!(manifest.require_repository_url().is_err());
  }
}
