//! Tag & publish: bump, changelog, commit, tag, push, GitHub release

use crate::core::context::ProjectContext;
use crate::core::error::{RemoteReleaseError, ShipResult};
use crate::core::vcs::GitOps;
use crate::release::bump::BumpKind;
use crate::release::changelog::{self, ChangelogRequest};
use crate::release::github::{self, ReleaseApi, ReleaseRecord};
use crate::release::manifest::Manifest;
use crate::utils::{normalize_repository_url, parse_owner_repo, path_to_git_format};
use chrono::SecondsFormat;
use semver::Version;
use tracing::info;

/// Inputs shared by `release` and `tag`
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
  pub bump: BumpKind,
  /// Subtitle for the changelog heading and release title
  pub label: Option<String>,
  /// Changelog range start (default: latest tag)
  pub start_tag: Option<String>,
  /// Changelog range end (default: HEAD)
  pub end_tag: Option<String>,
}

/// What happened on the GitHub side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubOutcome {
  /// No credential file
  Skipped,
  Created { status: u16, message: String },
}

/// Result of a tag-and-publish run
#[derive(Debug, Clone)]
pub struct TagOutcome {
  pub previous: Version,
  pub version: Version,
  pub tag: String,
  pub github: GitHubOutcome,
}

/// `v` + version
pub fn tag_name(version: &Version) -> String {
  format!("v{}", version)
}

/// Credential and target repository, resolved before anything is modified
struct GitHubTarget {
  token: String,
  owner: String,
  repo: String,
}

fn resolve_github_target(ctx: &ProjectContext, repository_url: &str) -> ShipResult<Option<GitHubTarget>> {
  let credential = ctx.path(&ctx.config.project.credential_file);
  let Some(token) = github::read_token(&credential)? else {
    info!(path = %credential.display(), "no credential file, GitHub release disabled");
    return Ok(None);
  };

  let release = &ctx.config.release;
  let (owner, repo) = match (&release.owner, &release.repo) {
    (Some(owner), Some(repo)) => (owner.clone(), repo.clone()),
    (owner, repo) => {
      let (parsed_owner, parsed_repo) =
        parse_owner_repo(repository_url).ok_or_else(|| RemoteReleaseError::UnknownRepository {
          url: Some(repository_url.to_string()),
        })?;
      (
        owner.clone().unwrap_or(parsed_owner),
        repo.clone().unwrap_or(parsed_repo),
      )
    }
  };

  Ok(Some(GitHubTarget { token, owner, repo }))
}

/// Run the tag-and-publish step
///
/// A failure after the commit leaves the bumped manifest committed locally.
pub fn run_tag_release(ctx: &ProjectContext, opts: &ReleaseOptions, api: &dyn ReleaseApi) -> ShipResult<TagOutcome> {
  let git = ctx.git.as_ref();
  let config = &ctx.config;

  let manifest_rel = config.project.manifest_path(&ctx.root);
  let changelog_rel = config.project.changelog.clone();
  let changelog_path = ctx.path(&changelog_rel);

  let mut manifest = Manifest::load(&ctx.path(&manifest_rel))?;
  let previous = manifest.version().clone();
  let version = opts.bump.apply(&previous)?;
  let tag = tag_name(&version);
  info!(%previous, %version, bump = %opts.bump, "computed release version");

  let repository_url = normalize_repository_url(&manifest.require_repository_url()?);
  let target = resolve_github_target(ctx, &repository_url)?;

  let from = match &opts.start_tag {
    Some(start) => Some(start.clone()),
    None => git.latest_tag()?,
  };
  let request = ChangelogRequest {
    repository_url: repository_url.clone(),
    version: version.to_string(),
    date: ctx.clock.now().date_naive(),
    subtitle: opts.label.clone(),
    from,
    to: opts.end_tag.clone().unwrap_or_else(|| "HEAD".to_string()),
  };
  let section = changelog::generate(git, &request)?;
  println!("📝 Changelog {} ({})", version, request.from.as_deref().unwrap_or("full history"));

  manifest.set_version(&version);
  manifest.save()?;
  changelog::write_changelog(&changelog_path, &section)?;

  let manifest_spec = path_to_git_format(&manifest_rel);
  let changelog_spec = path_to_git_format(&changelog_rel);
  git.add(&[manifest_spec.as_str(), changelog_spec.as_str()])?;
  git.commit(&format!("chore(release): {}", tag))?;

  let stamp = ctx.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true);
  git.tag_annotated(&tag, &format!("Release tagged by {} @ {}", ctx.actor, stamp))?;
  println!("🏷️  Tagged {}", tag);

  let remote = &config.git.remote;
  git.push(remote, &config.git.branch)?;
  git.push(remote, &tag)?;
  println!("📤 Pushed {} and {} to {}", config.git.branch, tag, remote);

  let github = match target {
    None => GitHubOutcome::Skipped,
    Some(target) => {
      // Same text the changelog now starts with, minus the anchor
      let body =
        changelog::latest_section(&changelog::merge(&section, "")).unwrap_or_else(|| section.trim().to_string());
      let name = match opts.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => format!("{} {}", tag, label),
        None => tag.clone(),
      };
      let record = ReleaseRecord {
        owner: target.owner,
        repo: target.repo,
        tag_name: tag.clone(),
        name,
        body,
      };

      let delay = config.release.api_delay();
      info!(delay_ms = delay.as_millis() as u64, "waiting before release API call");
      ctx.clock.sleep(delay);

      let response = api.create_release(&target.token, &record)?;
      let message = github::report_created(response, config.release.created_status, &tag);
      GitHubOutcome::Created {
        status: response.status,
        message,
      }
    }
  };

  Ok(TagOutcome {
    previous,
    version,
    tag,
    github,
  })
}
