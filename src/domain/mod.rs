//! Domain layer - pure types with no I/O.
//!
//! - `foundation` - identifiers, errors, the state machine trait
//! - `guest` - sessions, verification, invalidation, claims

pub mod foundation;
pub mod guest;
