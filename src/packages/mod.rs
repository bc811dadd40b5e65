// src/packages/mod.rs

//! Package data model for Chopsticks
//!
//! A package is described by a `Manifest`: its name, opaque version,
//! dependency names, and the ordered action lists for install, uninstall
//! and update. A resolved plan pairs each manifest with an `Operation`.

pub mod manifest;

pub use manifest::{Manifest, Operation};

/// Ordered `(manifest, operation)` pairs produced by the resolver
pub type Plan = Vec<(Manifest, Operation)>;
