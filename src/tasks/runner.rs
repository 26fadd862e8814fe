//! Runs execution plans from the task graph

use super::{DOCUMENT, TEST, Task, TaskAction, TaskGraph, shell, site};
use crate::core::context::ProjectContext;
use crate::core::error::{ShipResult, TaskError};
use crate::release::github::ReleaseApi;
use crate::release::orchestrator::{Orchestrator, Verifier};
use crate::release::tag::{GitHubOutcome, ReleaseOptions, TagOutcome, run_tag_release};
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
  Running,
  Succeeded,
  Failed,
}

/// Executes tasks against one project; each task runs at most once per runner.
///
/// Safe to share between threads: a thread that reaches a task another
/// thread is running waits for it, and a failed task fails every later
/// request for it.
pub struct TaskRunner<'a> {
  ctx: &'a ProjectContext,
  graph: &'a TaskGraph,
  api: &'a dyn ReleaseApi,
  release: ReleaseOptions,
  /// Set on the runner that verifies a release
  verifying: bool,
  states: Mutex<HashMap<String, TaskState>>,
  settled: Condvar,
}

/// A task this thread owns until it settles; dropping it unsettled marks it failed
struct Claim<'r, 'a> {
  runner: &'r TaskRunner<'a>,
  name: &'r str,
  succeeded: bool,
}

impl Drop for Claim<'_, '_> {
  fn drop(&mut self) {
    let state = if self.succeeded {
      TaskState::Succeeded
    } else {
      TaskState::Failed
    };
    self.runner.states().insert(self.name.to_string(), state);
    self.runner.settled.notify_all();
  }
}

impl<'a> TaskRunner<'a> {
  pub fn new(ctx: &'a ProjectContext, graph: &'a TaskGraph, api: &'a dyn ReleaseApi, release: ReleaseOptions) -> Self {
    Self {
      ctx,
      graph,
      api,
      release,
      verifying: false,
      states: Mutex::new(HashMap::new()),
      settled: Condvar::new(),
    }
  }

  /// Runner for a release's tests and docs, with nothing marked as run
  fn verification(&self) -> TaskRunner<'a> {
    TaskRunner {
      verifying: true,
      ..TaskRunner::new(self.ctx, self.graph, self.api, self.release.clone())
    }
  }

  /// Run `targets` and their prerequisites. Stops at the first failure.
  ///
  /// Returns the names of the tasks that ran.
  pub fn run(&self, targets: &[String]) -> ShipResult<Vec<String>> {
    let plan = self.graph.execution_plan(targets)?;
    let mut ran = Vec::new();

    for task in plan {
      let Some(mut claim) = self.claim(&task.name)? else {
        continue;
      };
      self.execute(task)?;
      claim.succeeded = true;
      ran.push(task.name.clone());
    }

    Ok(ran)
  }

  fn states(&self) -> MutexGuard<'_, HashMap<String, TaskState>> {
    self.states.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Take ownership of a task, or `None` when it already succeeded.
  ///
  /// Blocks while another thread runs it.
  fn claim<'r>(&'r self, name: &'r str) -> ShipResult<Option<Claim<'r, 'a>>> {
    let mut states = self.states();
    loop {
      match states.get(name) {
        None => {
          states.insert(name.to_string(), TaskState::Running);
          return Ok(Some(Claim {
            runner: self,
            name,
            succeeded: false,
          }));
        }
        Some(TaskState::Running) => {
          debug!(task = name, "waiting for task started on another thread");
          states = self.settled.wait(states).unwrap_or_else(PoisonError::into_inner);
        }
        Some(TaskState::Succeeded) => return Ok(None),
        Some(TaskState::Failed) => {
          return Err(
            TaskError::PrerequisiteFailed {
              task: name.to_string(),
            }
            .into(),
          );
        }
      }
    }
  }

  fn execute(&self, task: &Task) -> ShipResult<()> {
    let started = Instant::now();
    println!("▶️  {}", task.name);

    match &task.action {
      TaskAction::Command(argv) => shell::run_command(&task.name, argv, &self.ctx.root)?,
      // Members already ran as part of the plan
      TaskAction::Sequence(_) => {}
      TaskAction::Clean => site::clean(self.ctx)?,
      TaskAction::PublishSite => site::publish(self.ctx)?,
      TaskAction::Release | TaskAction::ReleaseTag if self.verifying => {
        return Err(
          TaskError::NestedRelease {
            task: task.name.clone(),
          }
          .into(),
        );
      }
      TaskAction::Release => {
        // Tests and docs run after the pull even if they already ran in this invocation
        let verification = self.verification();
        let mut orchestrator = Orchestrator::new(self.ctx, &verification, self.api);
        let result = orchestrator.run(&self.release);
        debug!(
          stages = ?orchestrator.stages(),
          skipped_stash = orchestrator.skipped_stash(),
          "release pipeline finished"
        );
        print_release(&result?);
      }
      TaskAction::ReleaseTag => {
        let outcome = run_tag_release(self.ctx, &self.release, self.api)?;
        print_release(&outcome);
      }
    }

    info!(task = %task.name, elapsed_ms = started.elapsed().as_millis() as u64, "task finished");
    println!("✅ {} ({:.1}s)", task.name, started.elapsed().as_secs_f64());
    Ok(())
  }
}

impl Verifier for TaskRunner<'_> {
  fn run_tests(&self) -> ShipResult<()> {
    self.run(&[TEST.to_string()]).map(|_| ())
  }

  fn build_docs(&self) -> ShipResult<()> {
    self.run(&[DOCUMENT.to_string()]).map(|_| ())
  }
}

/// Summary lines for a finished tag-and-publish
pub fn print_release(outcome: &TagOutcome) {
  println!("🚀 Released {} ({} → {})", outcome.tag, outcome.previous, outcome.version);
  match &outcome.github {
    GitHubOutcome::Skipped => println!("   GitHub release skipped (no credential file)"),
    GitHubOutcome::Created { status, message } => println!("   {} (HTTP {})", message, status),
  }
}
