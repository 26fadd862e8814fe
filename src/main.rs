mod commands;
mod core;
mod release;
mod tasks;
mod utils;

use clap::{Args, Parser, Subcommand};
use crate::core::error::{ShipError, print_error};
use crate::release::{BumpKind, ReleaseOptions};
use std::path::PathBuf;

/// Build, publish and release tasks with changelogs and GitHub releases
#[derive(Parser)]
#[command(name = "shiprail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Run as if started in this directory
  #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
  directory: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List tasks with descriptions and prerequisites
  Tasks {
    /// Output the task list in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run tasks (and their prerequisites)
  Run {
    /// Task names, e.g. `site:publish`
    #[arg(required = true)]
    tasks: Vec<String>,
    #[command(flatten)]
    bump: BumpArgs,
  },

  /// Stash, pull, run tests and docs, then tag and publish a release
  Release {
    #[command(flatten)]
    bump: BumpArgs,
  },

  /// Bump, changelog, commit, tag and push without the release checks
  Tag {
    #[command(flatten)]
    bump: BumpArgs,
  },

  /// Write a default shiprail.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },
}

/// Version bump and changelog options
#[derive(Args, Debug, Default)]
struct BumpArgs {
  /// Subtitle for the changelog heading and release title
  #[arg(short, long)]
  label: Option<String>,
  /// Bump the major version
  #[arg(short = 'M', long)]
  major: bool,
  /// Bump the minor version
  #[arg(short, long)]
  minor: bool,
  /// Bump the patch version (default)
  #[arg(short, long)]
  patch: bool,
  /// Bump the prerelease version
  #[arg(long)]
  prerelease: bool,
  /// Changelog start tag (default: latest tag)
  #[arg(long, value_name = "TAG")]
  start_tag: Option<String>,
  /// Changelog end tag (default: HEAD)
  #[arg(long, value_name = "TAG")]
  end_tag: Option<String>,
}

impl From<BumpArgs> for ReleaseOptions {
  fn from(args: BumpArgs) -> Self {
    Self {
      bump: BumpKind::from_flags(args.major, args.minor, args.patch, args.prerelease),
      label: args.label,
      start_tag: args.start_tag,
      end_tag: args.end_tag,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  crate::core::logging::init_tracing(cli.verbose);

  let dir = match cli.directory {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(1);
      }
    },
  };

  // init runs before any configuration (or repository) exists
  if let Commands::Init { force } = cli.command {
    if let Err(err) = commands::run_init(&dir, force) {
      handle_error(err);
    }
    return;
  }

  // Build project context once (repository root, actor, clock, config)
  let ctx = match crate::core::context::ProjectContext::build(&dir) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };

  let result = match cli.command {
    Commands::Tasks { json } => commands::run_tasks_list(&ctx, json),
    Commands::Run { tasks, bump } => commands::run_tasks(&ctx, &tasks, bump.into()),
    Commands::Release { bump } => commands::run_release(&ctx, bump.into()),
    Commands::Tag { bump } => commands::run_tag(&ctx, bump.into()),
    Commands::Init { .. } => Ok(()),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
