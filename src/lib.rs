//! gatehouse library crate.
//!
//! The deliverable is the `gatehouse` binary installed as a repository's
//! pre-receive/post-receive hook; the library holds the pipeline the
//! binary wires together, from parsing git's update lines through running
//! the configured actions against every pushed commit.

pub mod actions;
pub mod clients;
pub mod commit;
pub mod config;
pub mod controller;
pub mod error;
pub mod registry;
pub mod runner;
pub mod telemetry;
pub mod walker;

#[cfg(test)]
pub(crate) mod testutil;

// Modules only used by the binary (check, install) are declared in
// main.rs and not re-exported.
