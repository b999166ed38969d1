//! Auraa Luxury admin import library.
//!
//! Submits bulk product import jobs to the backend, polls their status on a
//! fixed interval and exposes the progress as a stream of snapshots.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the import job endpoints
//! - [`import`] - Import controller, poll scheduler and progress model
//! - [`config`] - Environment configuration
//!
//! # Security
//!
//! Every backend call carries the admin session token. The token is never
//! logged and is redacted from `Debug` output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod import;

pub use api::{JobApi, JobClient};
pub use config::{AdminConfig, ConfigError};
pub use import::{ImportController, JobProgressModel, PollState, ProgressSnapshot};
