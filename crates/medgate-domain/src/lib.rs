//! Domain types shared across MedGate crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod audit;
pub mod id;
pub mod prescription;
pub mod role;
