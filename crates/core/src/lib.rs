//! Auraa Core - Shared import-job types.
//!
//! This crate provides the types shared by the Auraa Luxury admin tools:
//! - `admin` - Job client, poll scheduler and import controller
//! - `cli` - Command-line front end that renders import progress
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no timers,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Import requests, job identifiers, job states and status snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
