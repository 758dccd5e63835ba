//! LED Matrix - host runtime for HUB75 RGB LED panels
//!
//! Architecture layers:
//! - [`myrtio_matrix_composer`] - Configuration, encoding and scanning (`no_std`)
//! - `core` - Frame exchange and GPIO lease primitives
//! - `infrastructure` - Host delay and the refresh thread body
//! - `runtime` - [`RuntimeController`] lifecycle, tunables and telemetry
//!
//! ```no_run
//! use myrtio_led_matrix::{PanelConfig, RuntimeController, RuntimeOptions, SimulatedSink, rgb_from_u32};
//!
//! let config = PanelConfig::default();
//! let sink = SimulatedSink::new(&config);
//! let (mut controller, mut canvas) =
//!     RuntimeController::new(config, RuntimeOptions::default(), sink)?;
//! controller.start()?;
//! canvas.fill(None, rgb_from_u32(0x00_40_ff));
//! canvas.swap();
//! controller.stop()?;
//! # Ok::<(), myrtio_led_matrix::RuntimeError>(())
//! ```

pub mod core;
pub mod infrastructure;
pub mod runtime;

pub use myrtio_matrix_composer::color::rgb_from_u32;
pub use myrtio_matrix_composer::*;

pub use crate::core::sync::{Canvas, FrameReader, GpioLease, frame_exchange};
pub use infrastructure::drivers::StdDelay;
pub use runtime::{RuntimeController, RuntimeError, RuntimeEvent, RuntimeEvents};
