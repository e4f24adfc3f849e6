//! Shared API, exported to `tabgate`, `tabgate-gateway`, and `tabgate-client`.
//!
//! All inter-process communication is described in this crate.

pub mod config;
pub mod launch;
pub mod log;
pub mod message;
pub mod props;
pub mod tab;
