//! Course access classification for learner dashboards.
//!
//! [`access`] turns a learner's enrollment/expiry snapshot into active, expiring
//! and expired course sets; the remaining modules carry configuration, logging
//! and error plumbing for the service built on top.

pub mod access;
pub mod config;
pub mod error;
pub mod telemetry;
