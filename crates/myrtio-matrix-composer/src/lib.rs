#![no_std]

//! Matrix Composer - panel-driving engine for HUB75 RGB LED matrices
//!
//! Architecture layers:
//! - `config` - Validated panel geometry, timing and wiring ([`PanelConfig`])
//! - `mapper` - Pixel mapper chain (visible canvas -> hardware canvas)
//! - `framebuffer` - RGB pixel grid written by the application
//! - `processor` - Per-channel output processing (luminance, dithering)
//! - `bitplane` - Binary-coded-modulation encoder ([`BitPlaneEncoder`])
//! - `scan` - Row / bit-plane scan state machine ([`ScanDriver`])
//! - `sink` - Hardware abstraction ([`PanelSink`] trait + implementations)
//! - `state` - Shared state for tunables and refresh telemetry
//!
//! The scan driver is generic over `PanelSink`, allowing different hardware backends.

extern crate alloc;

pub mod bitplane;
pub mod color;
pub mod config;
pub mod framebuffer;
pub mod mapper;
pub mod math;
pub mod models;
pub mod processor;
pub mod scan;
pub mod sink;
pub mod state;

// Config exports
pub use config::{
    ConfigError, HardwareMapping, MatrixOptions, Multiplexing, PanelConfig, RowAddressType,
    RuntimeOptions, ScanMode,
};

// Color exports
pub use color::{LedSequence, Rgb};

// Framebuffer exports
pub use framebuffer::{Framebuffer, FramebufferError, Rect};

// Mapper exports
pub use mapper::{MapperChain, PixelMapper, Size};

// Encoder exports
pub use bitplane::{BitPlaneBuffer, BitPlaneEncoder};
pub use processor::OutputProcessor;

// Scan exports
pub use scan::{
    CycleReport, DwellTiming, MultiplexStrategy, RowAddressing, ScanDriver, ScanPhase, ScanState,
};

// Sink exports
pub use sink::{
    ChainPins, GpioPins, GpioSink, HardwareIoError, NoDelay, PanelSink, PinLayout, Signal,
    SimulatedSink, SinkStats,
};

// State exports
pub use state::{RuntimeStatus, SharedState, Tunables};

pub use models::RefreshSnapshot;
