//! Daybook - offline-first finance and task journal with gist sync
//!
//! This crate provides the core functionality for the `daybook` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Transaction, Task, Snapshot, Backup)
//! - [`store`] - In-process state with copy-on-write mutations
//! - [`storage`] - Local state file
//! - [`sync`] - Codec, merge, tombstone GC and the sync engine
//! - [`config`] - Configuration management
//! - [`clock`] - Monotonic mutation stamps
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
