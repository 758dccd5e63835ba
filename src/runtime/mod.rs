//! Runtime controller - refresh thread lifecycle
//!
//! The controller owns the scan driver while stopped and hands it to the
//! `matrix-refresh` thread while running. The application keeps drawing on
//! its [`Canvas`](crate::Canvas) and tunes the loop through the controller.

mod controller;
mod error;
mod events;

pub use controller::RuntimeController;
pub use error::RuntimeError;
pub use events::{RuntimeEvent, RuntimeEvents};
