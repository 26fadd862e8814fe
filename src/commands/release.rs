//! `shiprail release` and `shiprail tag`

use crate::commands::run::run_tasks;
use crate::core::context::ProjectContext;
use crate::core::error::ShipResult;
use crate::release::ReleaseOptions;
use crate::tasks::{RELEASE, RELEASE_TAG};

/// Full pipeline: stash, pull, test + docs, tag & publish, restore
pub fn run_release(ctx: &ProjectContext, opts: ReleaseOptions) -> ShipResult<()> {
  announce("Releasing", ctx, &opts);
  run_tasks(ctx, &[RELEASE.to_string()], opts)
}

/// Tag & publish alone, without stash/pull/verification
pub fn run_tag(ctx: &ProjectContext, opts: ReleaseOptions) -> ShipResult<()> {
  announce("Tagging", ctx, &opts);
  run_tasks(ctx, &[RELEASE_TAG.to_string()], opts)
}

fn announce(verb: &str, ctx: &ProjectContext, opts: &ReleaseOptions) {
  println!("🚢 {} {} ({} bump) as {}", verb, ctx.root.display(), opts.bump, ctx.actor);
  if let Some(label) = &opts.label {
    println!("   label: {}", label);
  }
}
