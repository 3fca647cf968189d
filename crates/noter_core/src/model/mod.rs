//! Domain model for notes that annotate document locations.
//!
//! # Responsibility
//! - Define the location value shared by every document kind.
//! - Define note entries, their reserved properties and property literals.
//!
//! # Invariants
//! - Locations are compared only against locations of the same kind.
//! - Exactly one property key is reserved per semantic role.

pub mod entry;
pub mod literal;
pub mod location;
