//! Repository URL and path helpers

use std::path::Path;

/// npm shorthand prefixes and the hosts they stand for
const SHORTHAND_HOSTS: &[(&str, &str)] = &[
  ("github:", "github.com"),
  ("gitlab:", "gitlab.com"),
  ("bitbucket:", "bitbucket.org"),
];

/// Normalize a manifest repository URL to `https://host/owner/repo`
///
/// Accepts:
/// - `git+https://github.com/o/r.git`
/// - `git@github.com:o/r.git`
/// - `git://github.com/o/r.git`
/// - `ssh://git@github.com/o/r.git`
/// - `github:o/r`, `gitlab:o/r`, `bitbucket:o/r` and bare `o/r` (GitHub)
/// - `https://github.com/o/r` (returned as-is, minus a trailing slash)
pub fn normalize_repository_url(url: &str) -> String {
  let mut url = url.trim();
  url = url.strip_prefix("git+").unwrap_or(url);
  url = url.trim_end_matches('/');
  url = url.strip_suffix(".git").unwrap_or(url);

  for (prefix, host) in SHORTHAND_HOSTS {
    if let Some(path) = url.strip_prefix(prefix) {
      return format!("https://{}/{}", host, path.trim_start_matches('/'));
    }
  }

  if is_bare_owner_repo(url) {
    return format!("https://github.com/{}", url);
  }

  if let Some(rest) = url.strip_prefix("git://") {
    return format!("https://{}", rest);
  }

  if let Some(rest) = url.strip_prefix("ssh://") {
    let rest = rest.split_once('@').map(|(_, host)| host).unwrap_or(rest);
    return format!("https://{}", rest);
  }

  // scp-like: git@host:owner/repo
  if !url.contains("://")
    && let Some((user_host, path)) = url.split_once(':')
  {
    let host = user_host.split_once('@').map(|(_, host)| host).unwrap_or(user_host);
    return format!("https://{}/{}", host, path.trim_start_matches('/'));
  }

  url.to_string()
}

/// `owner/repo` with nothing else around it
fn is_bare_owner_repo(url: &str) -> bool {
  if url.contains(':') || url.contains('@') || url.contains(char::is_whitespace) {
    return false;
  }
  matches!(url.split_once('/'), Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
}

/// Extract `(owner, repo)` from a repository URL in any form accepted by
/// [`normalize_repository_url`]
pub fn parse_owner_repo(url: &str) -> Option<(String, String)> {
  let normalized = normalize_repository_url(url);
  let path = normalized.split_once("://").map(|(_, rest)| rest)?;
  let mut segments = path.split('/').skip(1).filter(|s| !s.is_empty());
  let owner = segments.next()?;
  let repo = segments.next()?;
  if segments.next().is_some() {
    return None;
  }
  Some((owner.to_string(), repo.to_string()))
}

/// Convert a path to git pathspec format (forward slashes, even on Windows)
pub fn path_to_git_format(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
