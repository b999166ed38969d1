//! Core types for Auraa import jobs.
//!
//! This module provides type-safe wrappers for the import job lifecycle.

pub mod id;
pub mod import;
pub mod job;
pub mod status;

pub use id::JobId;
pub use import::{ImportRequest, Provider, ValidationError};
pub use job::{JobHandle, JobStatus};
pub use status::JobState;
