//! Core domain + application logic for the photo capture bot.
//!
//! This crate is intentionally framework-agnostic. Discord and the remote
//! album service live behind ports (traits) implemented in adapter crates.

pub mod bot;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod logging;
pub mod ports;
pub mod registry;
pub mod sync;

pub use errors::{Error, Result};
