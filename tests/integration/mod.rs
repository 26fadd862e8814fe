//! Integration tests for shiprail
//!
//! Every test builds a throwaway repository with a bare `origin`
//! and drives the compiled binary against it.

mod helpers;
mod test_init;
mod test_release;
mod test_tasks;
