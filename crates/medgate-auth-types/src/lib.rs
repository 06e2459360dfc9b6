//! Credential primitives shared by the MedGate service and its tests.
//!
//! Provides bearer-token extraction, session-token generation, and verification-code
//! generation/comparison.

pub mod bearer;
pub mod code;
pub mod token;
