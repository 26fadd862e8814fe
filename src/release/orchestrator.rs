//! Release orchestrator
//!
//! ```text
//! StashChanges -> PullLatest -> {RunTests, BuildDocs} -> TagRelease -> RestoreStash -> Done
//!        \______________\_______________\__________________\_______________\-> Aborted
//! ```
//!
//! Tests and docs run concurrently. The stash is restored whatever happens
//! after it was taken; a restore failure never hides an earlier error.

use crate::core::context::ProjectContext;
use crate::core::error::{ShipError, ShipResult};
use crate::core::vcs::{GitOps, StashOutcome};
use crate::release::github::ReleaseApi;
use crate::release::tag::{ReleaseOptions, TagOutcome, run_tag_release};
use std::fmt;
use tracing::{error, info};

/// States the orchestrator passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
  StashChanges,
  PullLatest,
  RunTests,
  BuildDocs,
  TagRelease,
  RestoreStash,
  Done,
  Aborted,
}

impl fmt::Display for ReleaseStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ReleaseStage::StashChanges => "stash changes",
      ReleaseStage::PullLatest => "pull latest",
      ReleaseStage::RunTests => "run tests",
      ReleaseStage::BuildDocs => "build docs",
      ReleaseStage::TagRelease => "tag release",
      ReleaseStage::RestoreStash => "restore stash",
      ReleaseStage::Done => "done",
      ReleaseStage::Aborted => "aborted",
    };
    write!(f, "{}", name)
  }
}

/// Verification run before tagging
pub trait Verifier: Sync {
  fn run_tests(&self) -> ShipResult<()>;
  fn build_docs(&self) -> ShipResult<()>;
}

/// Drives one release run
pub struct Orchestrator<'a> {
  ctx: &'a ProjectContext,
  verifier: &'a dyn Verifier,
  api: &'a dyn ReleaseApi,
  stages: Vec<ReleaseStage>,
  skip_stash: bool,
}

impl<'a> Orchestrator<'a> {
  pub fn new(ctx: &'a ProjectContext, verifier: &'a dyn Verifier, api: &'a dyn ReleaseApi) -> Self {
    Self {
      ctx,
      verifier,
      api,
      stages: Vec::new(),
      skip_stash: false,
    }
  }

  /// States entered so far, in order
  pub fn stages(&self) -> &[ReleaseStage] {
    &self.stages
  }

  /// Whether the stash step found nothing to save
  pub fn skipped_stash(&self) -> bool {
    self.skip_stash
  }

  fn enter(&mut self, stage: ReleaseStage) {
    info!(%stage, "release stage");
    self.stages.push(stage);
  }

  /// Run the full release
  pub fn run(&mut self, opts: &ReleaseOptions) -> ShipResult<TagOutcome> {
    let git = self.ctx.git.clone();

    self.enter(ReleaseStage::StashChanges);
    match git.stash() {
      Ok(outcome) => self.skip_stash = outcome == StashOutcome::NothingToSave,
      Err(err) => {
        self.enter(ReleaseStage::Aborted);
        return Err(err);
      }
    }
    if self.skip_stash {
      println!("📦 No local changes to stash");
    } else {
      println!("📦 Stashed local changes");
    }

    self.enter(ReleaseStage::PullLatest);
    let git_config = &self.ctx.config.git;
    if let Err(err) = git.pull(&git_config.remote, &git_config.branch) {
      self.restore(false);
      self.enter(ReleaseStage::Aborted);
      return Err(err);
    }

    self.enter(ReleaseStage::RunTests);
    self.enter(ReleaseStage::BuildDocs);
    let verifier = self.verifier;
    let (tests, docs) = rayon::join(|| verifier.run_tests(), || verifier.build_docs());

    let mut result = match tests.and(docs) {
      Ok(()) => {
        self.enter(ReleaseStage::TagRelease);
        run_tag_release(self.ctx, opts, self.api)
      }
      Err(err) => Err(err),
    };

    if let Some(restore_err) = self.restore(result.is_ok()) {
      result = Err(restore_err);
    }

    self.enter(if result.is_ok() {
      ReleaseStage::Done
    } else {
      ReleaseStage::Aborted
    });
    result
  }

  /// Pop the stash unless nothing was stashed.
  ///
  /// Returns the restore error only when `surface` is set; otherwise it is
  /// logged and dropped.
  fn restore(&mut self, surface: bool) -> Option<ShipError> {
    if self.skip_stash {
      return None;
    }
    self.enter(ReleaseStage::RestoreStash);
    match self.ctx.git.stash_pop() {
      Ok(()) => {
        println!("📦 Restored stashed changes");
        None
      }
      Err(err) if surface => Some(err),
      Err(err) => {
        error!(error = %err, "failed to restore stashed changes");
        None
      }
    }
  }
}
