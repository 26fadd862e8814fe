use serde::Serialize;

use crate::core::context::ProjectContext;
use crate::core::error::ShipResult;
use crate::release::{GitHubClient, ReleaseOptions};
use crate::tasks::{Task, TaskAction, TaskGraph, TaskRunner};

/// One row of `shiprail tasks --json`
#[derive(Debug, Serialize)]
struct TaskListing<'a> {
  name: &'a str,
  description: &'a str,
  deps: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  sequence: Option<&'a [String]>,
  action: &'a TaskAction,
}

impl<'a> From<&'a Task> for TaskListing<'a> {
  fn from(task: &'a Task) -> Self {
    let sequence = match &task.action {
      TaskAction::Sequence(members) => Some(members.as_slice()),
      _ => None,
    };
    Self {
      name: &task.name,
      description: &task.description,
      deps: &task.deps,
      sequence,
      action: &task.action,
    }
  }
}

/// Render the task list as text
pub fn format_task_list(graph: &TaskGraph) -> String {
  let width = graph.tasks().map(|t| t.name.len()).max().unwrap_or(0);
  let mut out = String::new();
  for task in graph.tasks() {
    out.push_str(&format!("  {:width$}  {}", task.name, task.description, width = width));
    let mut refs: Vec<&str> = task.deps.iter().map(String::as_str).collect();
    if let TaskAction::Sequence(members) = &task.action {
      refs.extend(members.iter().map(String::as_str));
    }
    if !refs.is_empty() {
      out.push_str(&format!(" [{}]", refs.join(", ")));
    }
    out.push('\n');
  }
  out
}

/// List tasks with descriptions and prerequisites
pub fn run_tasks_list(ctx: &ProjectContext, json: bool) -> ShipResult<()> {
  let graph = TaskGraph::from_config(&ctx.config)?;

  if json {
    let listing: Vec<TaskListing> = graph.tasks().map(TaskListing::from).collect();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    return Ok(());
  }

  println!("📋 Tasks");
  print!("{}", format_task_list(&graph));
  Ok(())
}

/// Run tasks with their prerequisites
pub fn run_tasks(ctx: &ProjectContext, names: &[String], release: ReleaseOptions) -> ShipResult<()> {
  let graph = TaskGraph::from_config(&ctx.config)?;
  let api = GitHubClient::new(&ctx.config.release.api_url)?;
  let runner = TaskRunner::new(ctx, &graph, &api, release);

  let ran = runner.run(names)?;
  println!("\n🎉 Finished {} task(s)", ran.len());
  Ok(())
}
