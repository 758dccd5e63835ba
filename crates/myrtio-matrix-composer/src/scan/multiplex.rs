//! Multiplex pass strategies
//!
//! Some panels cannot light every column of a row at once. Their rows are
//! emitted in several passes, each lighting a disjoint subset of pixels.
//! Every pixel is lit in exactly one pass.

use alloc::boxed::Box;

use crate::config::Multiplexing;

pub trait MultiplexStrategy {
    fn passes(&self) -> u8;

    /// Whether panel pixel `(x, y)` is lit during `pass`
    fn is_lit(&self, pass: u8, x: usize, y: usize) -> bool;
}

/// Every pixel in a single pass
pub struct DirectMultiplex;

impl MultiplexStrategy for DirectMultiplex {
    fn passes(&self) -> u8 {
        1
    }

    fn is_lit(&self, _pass: u8, _x: usize, _y: usize) -> bool {
        true
    }
}

/// Even columns, then odd columns
pub struct StripeMultiplex;

impl MultiplexStrategy for StripeMultiplex {
    fn passes(&self) -> u8 {
        2
    }

    fn is_lit(&self, pass: u8, x: usize, _y: usize) -> bool {
        x % 2 == usize::from(pass)
    }
}

/// Checkerboard halves
pub struct CheckerMultiplex;

impl MultiplexStrategy for CheckerMultiplex {
    fn passes(&self) -> u8 {
        2
    }

    fn is_lit(&self, pass: u8, x: usize, y: usize) -> bool {
        (x + y) % 2 == usize::from(pass)
    }
}

pub fn multiplex_strategy(kind: Multiplexing) -> Box<dyn MultiplexStrategy + Send> {
    match kind {
        Multiplexing::Direct => Box::new(DirectMultiplex),
        Multiplexing::Stripe => Box::new(StripeMultiplex),
        Multiplexing::Checker => Box::new(CheckerMultiplex),
    }
}
