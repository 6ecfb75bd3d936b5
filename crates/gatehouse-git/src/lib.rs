//! Git access layer for gatehouse.
//!
//! This crate defines the [`GitClient`] trait, the single interface through
//! which the hook pipeline reads from git. The pipeline never spawns `git`
//! itself; it depends on `gatehouse-git` and programs against the trait, so
//! tests can substitute a scripted double.
//!
//! # Crate layout
//!
//! - [`client`]: the [`GitClient`] trait definition.
//! - [`types`]: value types used in trait signatures ([`Oid`]).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.
//! - [`CliGit`]: the production implementation, which shells out to the
//!   `git` binary.

pub mod client;
pub mod error;
pub mod types;

mod cli_client;

pub use cli_client::CliGit;

// Re-export the main trait and commonly used types at the crate root for
// ergonomic imports: `use gatehouse_git::{GitClient, Oid, GitError};`
pub use client::GitClient;
pub use error::GitError;
pub use types::{Oid, OidParseError};
