//! Diagnostic logging setup
//!
//! User-facing progress goes to stdout with `println!`. Diagnostics (git
//! invocations, step transitions, cleanup failures) go through `tracing` to
//! stderr.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count
pub fn filter_for(verbose: u8) -> &'static str {
  match verbose {
    0 => "shiprail=warn",
    1 => "shiprail=info",
    2 => "shiprail=debug",
    _ => "shiprail=trace",
  }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbose)));

  // A second init (tests) is harmless
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}
