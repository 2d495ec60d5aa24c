//! # rowscan-core
//!
//! Domain types for RLS authorization probes:
//! - Identity and Session (who is probing, with what token)
//! - Probe, Observation, and ProbeResult (what was attempted, what came back)
//! - AccessPolicy and the pure table-driven verdict classifier
//! - Unique cleanup-tag generation

pub mod identity;
pub mod probe;
pub mod tag;
pub mod verdict;

pub use identity::{Identity, Session};
pub use probe::{Observation, Probe, ProbeOp, ProbeResult};
pub use verdict::{AccessPolicy, Verdict, classify};
