//! Infrastructure layer - host implementations
//!
//! Concrete delay provider and the refresh thread body.

pub mod drivers;
pub(crate) mod tasks;
