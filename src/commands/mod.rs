//! CLI commands for shiprail
//!
//! - **init**: write a default shiprail.toml
//! - **run**: list tasks, run tasks with their prerequisites
//! - **release**: full release pipeline, or the tag & publish step alone
//!
//! Everything except `init` takes the `&ProjectContext` built in main.rs.

pub mod init;
pub mod release;
pub mod run;

pub use init::run_init;
pub use release::{run_release, run_tag};
pub use run::{run_tasks, run_tasks_list};
