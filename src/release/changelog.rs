//! Changelog generation from conventional commits
//!
//! Parses commit messages with winnow, renders one release section in the
//! angular style (anchor, version heading, grouped entries with commit and
//! issue links), prepends it to the changelog file and extracts the newest
//! section back out for the GitHub release body.

use crate::core::error::{ChangelogError, ShipError, ShipResult};
use crate::core::vcs::{CommitInfo, GitBridge, GitOps};
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Version heading of a rendered section
static VERSION_HEADING: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^### \d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)? \(").expect("static regex"));

/// Anchor line that precedes every version heading
static TRAILING_ANCHOR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"\s*<a name="[^"]*"></a>\s*$"#).expect("static regex"));

/// Footer keys that close issues
const CLOSING_KEYWORDS: &[&str] = &[
  "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// A parsed conventional commit
///
/// Format: `<type>(<scope>)!: <description>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
  pub commit_type: CommitType,
  pub scope: Option<String>,
  pub description: String,
  pub body: Option<String>,
  /// `BREAKING CHANGE:` footer text; empty when only `!` was given
  pub breaking_change: Option<String>,
  /// Other footers (e.g., "Closes", "#123")
  pub footers: Vec<(String, String)>,
}

/// Conventional commit types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
  Feat,
  Fix,
  Perf,
  Docs,
  Style,
  Refactor,
  Test,
  Build,
  Ci,
  Chore,
  Revert,
  Other,
}

impl CommitType {
  /// Parse commit type from string
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "feat" | "feature" => Self::Feat,
      "fix" => Self::Fix,
      "perf" | "performance" => Self::Perf,
      "docs" | "doc" => Self::Docs,
      "style" => Self::Style,
      "refactor" => Self::Refactor,
      "test" | "tests" => Self::Test,
      "build" => Self::Build,
      "ci" => Self::Ci,
      "chore" => Self::Chore,
      "revert" => Self::Revert,
      _ => Self::Other,
    }
  }
}

impl ConventionalCommit {
  /// Parse a conventional commit from a git commit message
  ///
  /// Returns None if the message doesn't follow conventional commit format.
  pub fn parse(message: &str) -> Option<Self> {
    use winnow::ascii::{alphanumeric1, space0};
    use winnow::combinator::{opt, preceded, terminated};
    use winnow::prelude::*;
    use winnow::token::take_till;

    let (first_line, rest) = message.split_once('\n').unwrap_or((message, ""));

    // type(scope)!: description
    let mut parser = (
      alphanumeric1::<_, ()>.map(CommitType::from_str),
      opt(preceded('(', terminated(take_till(1.., ')'), ')'))),
      opt('!'),
      ':',
      space0,
      take_till(0.., ['\n', '\r']),
    );

    let Ok((commit_type, scope, breaking_indicator, _, _, description)) = parser.parse(first_line.trim_end()) else {
      return None;
    };
    let description: &str = description;
    if description.trim().is_empty() {
      return None;
    }

    let mut body_lines = Vec::new();
    let mut breaking_change = None;
    let mut footers = Vec::new();

    let mut in_body = true;
    let mut seen_empty_line = false;

    for line in rest.lines() {
      let trimmed = line.trim();

      if trimmed.is_empty() {
        seen_empty_line = true;
        continue;
      }

      // Footers come after an empty line: "Key: value" or "Key #value"
      if seen_empty_line && let Some((key, value)) = split_footer(trimmed) {
        if key.eq_ignore_ascii_case("BREAKING CHANGE") || key.eq_ignore_ascii_case("BREAKING-CHANGE") {
          breaking_change = Some(value.to_string());
          in_body = false;
          continue;
        } else if key.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
          footers.push((key.to_string(), value.to_string()));
          in_body = false;
          continue;
        }
      }

      if in_body {
        body_lines.push(line);
        seen_empty_line = false;
      }
    }

    if breaking_change.is_none() && breaking_indicator.is_some() {
      breaking_change = Some(String::new());
    }

    let body = if body_lines.is_empty() {
      None
    } else {
      Some(body_lines.join("\n"))
    };

    Some(Self {
      commit_type,
      scope: scope.map(|s: &str| s.to_string()),
      description: description.trim().to_string(),
      body,
      breaking_change,
      footers,
    })
  }

  /// Issue numbers referenced by closing footers (`Closes #12, #14`)
  pub fn closed_issues(&self) -> Vec<String> {
    self
      .footers
      .iter()
      .filter(|(key, _)| CLOSING_KEYWORDS.iter().any(|k| key.eq_ignore_ascii_case(k)))
      .flat_map(|(_, value)| value.split([',', ' ']))
      .filter_map(|token| token.trim().strip_prefix('#'))
      .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
      .map(str::to_string)
      .collect()
  }
}

fn split_footer(line: &str) -> Option<(&str, &str)> {
  if let Some((key, value)) = line.split_once(": ") {
    return Some((key.trim(), value.trim()));
  }
  if let Some((key, value)) = line.split_once(':')
    && key.eq_ignore_ascii_case("BREAKING CHANGE")
  {
    return Some((key.trim(), value.trim()));
  }
  // "Closes #123"
  let (key, _) = line.split_once(" #")?;
  Some((key.trim(), line[key.len()..].trim()))
}

/// Input for one changelog section
#[derive(Debug, Clone)]
pub struct ChangelogRequest {
  /// Normalized `https://host/owner/repo` URL used for links
  pub repository_url: String,
  pub version: String,
  pub date: NaiveDate,
  /// Text appended to the heading in quotes
  pub subtitle: Option<String>,
  /// Exclusive start of the range; None means full history
  pub from: Option<String>,
  pub to: String,
}

impl ChangelogRequest {
  fn range(&self) -> String {
    match &self.from {
      Some(from) => format!("{}..{}", from, self.to),
      None => self.to.clone(),
    }
  }
}

/// A commit entry in one group
struct Entry<'a> {
  text: String,
  sha: &'a str,
  closes: Vec<String>,
}

/// Read the commit range and render the release section
pub fn generate<G: GitBridge + ?Sized>(git: &G, request: &ChangelogRequest) -> ShipResult<String> {
  let commits = git
    .log_range(request.from.as_deref(), &request.to)
    .map_err(|err| {
      ShipError::Changelog(ChangelogError::History {
        range: request.range(),
        reason: err.to_string(),
      })
    })?;

  Ok(render_section(request, &commits))
}

/// Render a section from commits (newest first)
pub fn render_section(request: &ChangelogRequest, commits: &[CommitInfo]) -> String {
  let mut fixes = Vec::new();
  let mut features = Vec::new();
  let mut perf = Vec::new();
  let mut breaking = Vec::new();

  for info in commits {
    let Some(commit) = ConventionalCommit::parse(&info.message) else {
      continue;
    };
    let scoped = match &commit.scope {
      Some(scope) if scope != "*" => format!("**{}:** {}", scope, commit.description),
      _ => commit.description.clone(),
    };
    let closes = commit.closed_issues();

    let group = match commit.commit_type {
      CommitType::Fix => Some(&mut fixes),
      CommitType::Feat => Some(&mut features),
      CommitType::Perf => Some(&mut perf),
      _ => None,
    };
    if let Some(group) = group {
      group.push(Entry {
        text: scoped.clone(),
        sha: &info.sha,
        closes: closes.clone(),
      });
    }

    if let Some(note) = &commit.breaking_change {
      let text = if note.is_empty() { scoped } else { note.clone() };
      breaking.push(Entry {
        text,
        sha: &info.sha,
        closes,
      });
    }
  }

  let mut out = String::new();
  out.push_str(&format!("<a name=\"{}\"></a>\n", request.version));
  out.push_str(&format!("### {} ({})", request.version, request.date.format("%Y-%m-%d")));
  if let Some(subtitle) = request.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
    out.push_str(&format!(" \"{}\"", subtitle.trim()));
  }
  out.push_str("\n\n");

  for (title, entries) in [
    ("Bug Fixes", &fixes),
    ("Features", &features),
    ("Performance Improvements", &perf),
    ("Breaking Changes", &breaking),
  ] {
    if entries.is_empty() {
      continue;
    }
    out.push_str(&format!("#### {}\n\n", title));
    for entry in entries {
      out.push_str(&render_entry(&request.repository_url, entry));
    }
    out.push('\n');
  }

  out
}

fn render_entry(repo: &str, entry: &Entry<'_>) -> String {
  let short: String = entry.sha.chars().take(7).collect();
  let mut line = format!("* {} ([{}]({}/commit/{}))", entry.text, short, repo, entry.sha);
  if !entry.closes.is_empty() {
    let links: Vec<String> = entry
      .closes
      .iter()
      .map(|n| format!("[#{}]({}/issues/{})", n, repo, n))
      .collect();
    line.push_str(&format!(", closes {}", links.join(" ")));
  }
  line.push('\n');
  line
}

/// New section followed by the previous changelog contents
pub fn merge(section: &str, existing: &str) -> String {
  let mut out = section.trim_end().to_string();
  out.push_str("\n\n");
  let existing = existing.trim_start();
  if !existing.is_empty() {
    out.push_str(existing);
    if !out.ends_with('\n') {
      out.push('\n');
    }
  }
  out
}

/// Prepend `section` to the changelog at `path`, overwriting the file
pub fn write_changelog(path: &Path, section: &str) -> ShipResult<()> {
  let io_err = |err: std::io::Error| {
    ShipError::Changelog(ChangelogError::Io {
      path: path.to_path_buf(),
      reason: err.to_string(),
    })
  };

  let existing = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
    Err(err) => return Err(io_err(err)),
  };

  fs::write(path, merge(section, &existing)).map_err(io_err)
}

/// The newest release section: from the first version heading up to the second
pub fn latest_section(changelog: &str) -> Option<String> {
  let mut headings = VERSION_HEADING.find_iter(changelog);
  let first = headings.next()?;
  let end = headings.next().map(|m| m.start()).unwrap_or(changelog.len());

  let section = &changelog[first.start()..end];
  let section = TRAILING_ANCHOR.replace(section, "");
  Some(section.trim_end().to_string())
}
