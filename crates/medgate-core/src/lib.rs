//! Cross-cutting service plumbing: clock, config loading, health probes, request ids,
//! serde helpers, and tracing setup.

pub mod clock;
pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
