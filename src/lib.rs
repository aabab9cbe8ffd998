//! cb: AWS CodeBuild utility
//!
//! Layers, innermost first:
//! - `domain`: build records, statuses, log locations (no I/O)
//! - `infrastructure`: call context, AWS boundary traits and their SDK
//!   implementations, DI container
//! - `application`: the `BuildService` contract and its stub/cloud backends
//! - `cli`: argument parsing, dispatch, output, exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
