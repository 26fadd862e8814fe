//! Version bumps with npm-style prerelease handling

use crate::core::error::{ManifestError, ShipError, ShipResult};
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version bump kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
  Major,
  Minor,
  #[default]
  Patch,
  Prerelease,
}

impl BumpKind {
  /// Pick one kind from CLI flags: major > minor > prerelease > patch.
  /// `--patch` only restates the default.
  pub fn from_flags(major: bool, minor: bool, _patch: bool, prerelease: bool) -> Self {
    if major {
      BumpKind::Major
    } else if minor {
      BumpKind::Minor
    } else if prerelease {
      BumpKind::Prerelease
    } else {
      BumpKind::Patch
    }
  }

  /// Apply this bump. Build metadata is always cleared.
  pub fn apply(self, current: &Version) -> ShipResult<Version> {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;
    let is_pre = !current.pre.is_empty();

    match self {
      BumpKind::Major => {
        // 2.0.0-rc.1 -> 2.0.0
        if !(is_pre && current.minor == 0 && current.patch == 0) {
          next.major += 1;
          next.minor = 0;
          next.patch = 0;
        }
        next.pre = Prerelease::EMPTY;
      }
      BumpKind::Minor => {
        if !(is_pre && current.patch == 0) {
          next.minor += 1;
          next.patch = 0;
        }
        next.pre = Prerelease::EMPTY;
      }
      BumpKind::Patch => {
        if !is_pre {
          next.patch += 1;
        }
        next.pre = Prerelease::EMPTY;
      }
      BumpKind::Prerelease => {
        if is_pre {
          next.pre = increment_prerelease(&current.pre)?;
        } else {
          next.patch += 1;
          next.pre = parse_prerelease("0")?;
        }
      }
    }

    Ok(next)
  }
}

impl fmt::Display for BumpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BumpKind::Major => "major",
      BumpKind::Minor => "minor",
      BumpKind::Patch => "patch",
      BumpKind::Prerelease => "prerelease",
    };
    write!(f, "{}", name)
  }
}

/// Bump the last numeric identifier, or append `.0` when there is none
fn increment_prerelease(pre: &Prerelease) -> ShipResult<Prerelease> {
  let mut identifiers: Vec<String> = pre.as_str().split('.').map(str::to_string).collect();

  let last_numeric = identifiers.iter().rposition(|id| id.parse::<u64>().is_ok());
  match last_numeric {
    Some(idx) => {
      let n: u64 = identifiers[idx].parse().unwrap_or(0);
      identifiers[idx] = (n + 1).to_string();
    }
    None => identifiers.push("0".to_string()),
  }

  parse_prerelease(&identifiers.join("."))
}

fn parse_prerelease(text: &str) -> ShipResult<Prerelease> {
  Prerelease::new(text).map_err(|e| {
    ShipError::Manifest(ManifestError::InvalidVersion {
      version: text.to_string(),
      message: e.to_string(),
    })
  })
}

/// Parse a manifest version string
pub fn parse_version(text: &str) -> ShipResult<Version> {
  Version::parse(text.trim()).map_err(|e| {
    ShipError::Manifest(ManifestError::InvalidVersion {
      version: text.to_string(),
      message: e.to_string(),
    })
  })
}
