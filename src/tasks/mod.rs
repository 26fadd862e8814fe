//! Named tasks with prerequisites
//!
//! Built-in tasks cover the site and release workflow; `[tasks.<name>]` in
//! shiprail.toml overrides their commands or adds new tasks. The graph is
//! validated with petgraph (unknown references, cycles) and flattened into
//! an execution plan where every task appears once.

pub mod runner;
pub mod shell;
pub mod site;

pub use runner::TaskRunner;

use crate::core::config::{ShipConfig, TaskConfig};
use crate::core::error::{ShipResult, TaskError};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const CLEAN: &str = "clean";
pub const DOCUMENT: &str = "document";
pub const STATIC_PAGES: &str = "static-pages";
pub const STATIC_ASSETS: &str = "static-assets";
pub const SITE: &str = "site";
pub const SITE_PUBLISH: &str = "site:publish";
pub const TEST: &str = "test";
pub const RELEASE: &str = "release";
pub const RELEASE_TAG: &str = "release:tag";

/// What a task does once its prerequisites are done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "args", rename_all = "kebab-case")]
pub enum TaskAction {
  /// External command (argv); empty means no-op
  Command(Vec<String>),
  /// Run these tasks in order
  Sequence(Vec<String>),
  /// Empty the site output directory
  Clean,
  /// Commit the site output and push it to the pages branch
  PublishSite,
  /// Full release pipeline
  Release,
  /// Tag & publish step alone
  ReleaseTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
  pub name: String,
  pub description: String,
  /// Prerequisites, run first in declared order
  pub deps: Vec<String>,
  pub action: TaskAction,
}

impl Task {
  fn new(name: &str, description: &str, deps: &[&str], action: TaskAction) -> Self {
    Self {
      name: name.to_string(),
      description: description.to_string(),
      deps: deps.iter().map(|d| d.to_string()).collect(),
      action,
    }
  }

  /// Tasks this one refers to: prerequisites, then sequence members
  fn references(&self) -> impl Iterator<Item = &String> {
    let members: &[String] = match &self.action {
      TaskAction::Sequence(members) => members,
      _ => &[],
    };
    self.deps.iter().chain(members.iter())
  }

  fn apply(&mut self, overrides: &TaskConfig) {
    if let Some(description) = &overrides.description {
      self.description = description.clone();
    }
    if let Some(deps) = &overrides.deps {
      self.deps = deps.clone();
    }
    if let Some(run) = &overrides.run {
      self.action = TaskAction::Command(run.clone());
    }
    if let Some(sequence) = &overrides.sequence {
      self.action = TaskAction::Sequence(sequence.clone());
    }
  }
}

fn argv(parts: &[&str]) -> Vec<String> {
  parts.iter().map(|p| p.to_string()).collect()
}

/// Built-in task set
pub fn builtin_tasks() -> Vec<Task> {
  vec![
    Task::new(CLEAN, "Remove the contents of the site output directory", &[], TaskAction::Clean),
    Task::new(
      DOCUMENT,
      "Build documentation",
      &[],
      TaskAction::Command(argv(&["cargo", "doc", "--no-deps"])),
    ),
    Task::new(STATIC_PAGES, "Build static pages", &[], TaskAction::Command(Vec::new())),
    Task::new(STATIC_ASSETS, "Build static assets", &[], TaskAction::Command(Vec::new())),
    Task::new(
      SITE,
      "Build the site: clean, then documentation, pages and assets in order",
      &[CLEAN],
      TaskAction::Sequence(argv(&[DOCUMENT, STATIC_PAGES, STATIC_ASSETS])),
    ),
    Task::new(
      SITE_PUBLISH,
      "Publish the site output to the GitHub pages branch",
      &[SITE],
      TaskAction::PublishSite,
    ),
    Task::new(TEST, "Run the test suite", &[], TaskAction::Command(argv(&["cargo", "test"]))),
    Task::new(
      RELEASE,
      "Stash, pull, test and document, then tag and publish a release",
      &[],
      TaskAction::Release,
    ),
    Task::new(
      RELEASE_TAG,
      "Bump, changelog, commit, tag and push (use `release` instead)",
      &[],
      TaskAction::ReleaseTag,
    ),
  ]
}

/// Validated task graph
#[derive(Debug, Clone)]
pub struct TaskGraph {
  tasks: BTreeMap<String, Task>,
}

impl TaskGraph {
  /// Built-in tasks merged with `[tasks.*]` from the config
  pub fn from_config(config: &ShipConfig) -> ShipResult<Self> {
    let mut tasks: BTreeMap<String, Task> = builtin_tasks().into_iter().map(|t| (t.name.clone(), t)).collect();

    for (name, overrides) in &config.tasks {
      let task = tasks
        .entry(name.clone())
        .or_insert_with(|| Task::new(name, "", &[], TaskAction::Command(Vec::new())));
      task.apply(overrides);
    }

    Self::new(tasks.into_values().collect())
  }

  /// Build and validate a graph from explicit tasks
  pub fn new(tasks: Vec<Task>) -> ShipResult<Self> {
    let graph = Self {
      tasks: tasks.into_iter().map(|t| (t.name.clone(), t)).collect(),
    };
    graph.validate()?;
    Ok(graph)
  }

  pub fn get(&self, name: &str) -> Option<&Task> {
    self.tasks.get(name)
  }

  /// All tasks, sorted by name
  pub fn tasks(&self) -> impl Iterator<Item = &Task> {
    self.tasks.values()
  }

  /// Reject unknown references and cycles
  fn validate(&self) -> ShipResult<()> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = self
      .tasks
      .keys()
      .map(|name| (name.as_str(), graph.add_node(name.as_str())))
      .collect();

    for task in self.tasks.values() {
      let from = nodes[task.name.as_str()];
      for reference in task.references() {
        let Some(&to) = nodes.get(reference.as_str()) else {
          return Err(
            TaskError::Unknown {
              name: reference.clone(),
              referenced_by: Some(task.name.clone()),
            }
            .into(),
          );
        };
        graph.add_edge(from, to, ());
      }
    }

    for component in algo::tarjan_scc(&graph) {
      let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
      if component.len() > 1 || self_loop {
        let mut tasks: Vec<String> = component.iter().map(|idx| graph[*idx].to_string()).collect();
        tasks.sort();
        return Err(TaskError::Cycle { tasks }.into());
      }
    }

    Ok(())
  }

  /// Tasks to run for `targets`, each once, prerequisites first
  ///
  /// Depth-first post-order: a task's deps, then its sequence members, then
  /// the task itself.
  pub fn execution_plan(&self, targets: &[String]) -> ShipResult<Vec<&Task>> {
    let mut plan = Vec::new();
    let mut seen = HashSet::new();
    for target in targets {
      if !self.tasks.contains_key(target) {
        return Err(
          TaskError::Unknown {
            name: target.clone(),
            referenced_by: None,
          }
          .into(),
        );
      }
      self.visit(target, &mut seen, &mut plan);
    }
    Ok(plan)
  }

  fn visit<'a>(&'a self, name: &str, seen: &mut HashSet<String>, plan: &mut Vec<&'a Task>) {
    if !seen.insert(name.to_string()) {
      return;
    }
    // validate() guarantees every reference exists and there are no cycles
    let Some(task) = self.get(name) else {
      return;
    };
    for reference in task.references() {
      self.visit(reference, seen, plan);
    }
    plan.push(task);
  }
}
