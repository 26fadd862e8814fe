//! Release pipeline
//!
//! # Flow
//!
//! `shiprail release` runs the [`orchestrator`]: stash, pull, tests and docs
//! in parallel, then [`tag`] (bump, changelog, commit, tag, push, GitHub
//! release), then restore the stash. `shiprail tag` runs [`tag`] alone.
//!
//! # Files touched
//!
//! - the manifest (`package.json` or `Cargo.toml`): version only
//! - the changelog: new section prepended, file rewritten
//! - the credential file: read only, gates the GitHub release

pub mod bump;
pub mod changelog;
pub mod github;
pub mod manifest;
pub mod orchestrator;
pub mod tag;

pub use bump::BumpKind;
pub use github::GitHubClient;
pub use tag::ReleaseOptions;
