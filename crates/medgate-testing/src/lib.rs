//! Test utilities for MedGate services.
//!
//! Provides a manually driven clock and bearer-header helpers.
//! Import from `[dev-dependencies]` only, never in production code.

pub mod auth;
pub mod clock;
