//! Double-buffered frame exchange
//!
//! Two framebuffers are shared between the application ([`Canvas`]) and the
//! refresh thread ([`FrameReader`]). A single atomic word tracks which slot
//! is the displayed (front) one, whether the application has handed over its
//! back slot, and whether a reader is attached.
//!
//! # Invariants
//! - The front slot is only read by the reader, the back slot is only
//!   accessed by the canvas.
//! - While `PENDING` is set the canvas does not touch the back slot; it
//!   waits inside [`Canvas::swap`] until the reader adopts it.
//! - Only the reader clears `PENDING` while it is attached; once detached
//!   the canvas completes the exchange itself.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

use myrtio_matrix_composer::Framebuffer;

/// Index of the front slot
const FRONT: u8 = 0b001;
/// Back slot handed over, waiting for adoption
const PENDING: u8 = 0b010;
/// A reader adopts swaps at cycle start
const ATTACHED: u8 = 0b100;

struct FrameExchange {
    slots: [UnsafeCell<Framebuffer>; 2],
    state: AtomicU8,
}

// SAFETY: access to the slots is partitioned by `state` as described in the
// module invariants; a slot is never reachable from both sides at once.
unsafe impl Sync for FrameExchange {}

impl FrameExchange {
    fn slot(&self, index: u8) -> *mut Framebuffer {
        self.slots[usize::from(index & FRONT)].get()
    }
}

/// Create the exchange for a `width × height` canvas
pub fn frame_exchange(width: usize, height: usize) -> (Canvas, FrameReader) {
    let exchange = Arc::new(FrameExchange {
        slots: [
            UnsafeCell::new(Framebuffer::new(width, height)),
            UnsafeCell::new(Framebuffer::new(width, height)),
        ],
        state: AtomicU8::new(0),
    });
    (
        Canvas {
            exchange: Arc::clone(&exchange),
        },
        FrameReader { exchange },
    )
}

/// Application side: the framebuffer being drawn
///
/// Dereferences to the back [`Framebuffer`].
pub struct Canvas {
    exchange: Arc<FrameExchange>,
}

impl Canvas {
    fn back(&self) -> *mut Framebuffer {
        let state = self.exchange.state.load(Ordering::Acquire);
        self.exchange.slot((state & FRONT) ^ FRONT)
    }

    /// Present the drawn frame and continue on the previously displayed one
    ///
    /// With a refresh thread attached, blocks until the thread adopts the
    /// frame at the start of its next cycle.
    pub fn swap(&mut self) {
        let state = &self.exchange.state;
        let mut current = state.load(Ordering::Acquire);
        loop {
            let next = if current & ATTACHED == 0 {
                current ^ FRONT
            } else {
                current | PENDING
            };
            match state.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) if next & PENDING == 0 => {
                    log::trace!("frame swapped without reader");
                    return;
                }
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        loop {
            let current = state.load(Ordering::Acquire);
            if current & PENDING == 0 {
                log::trace!("frame adopted by reader");
                return;
            }
            if current & ATTACHED == 0 {
                // Reader left before adopting the frame.
                let next = (current & !PENDING) ^ FRONT;
                if state
                    .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    return;
                }
                continue;
            }
            thread::yield_now();
        }
    }
}

impl Deref for Canvas {
    type Target = Framebuffer;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the back slot belongs to the canvas outside of `swap`.
        unsafe { &*self.back() }
    }
}

impl DerefMut for Canvas {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as above; `&mut self` makes the borrow exclusive.
        unsafe { &mut *self.back() }
    }
}

/// Refresh side: the displayed framebuffer
pub struct FrameReader {
    exchange: Arc<FrameExchange>,
}

impl FrameReader {
    /// Start adopting swaps; the canvas now waits for [`Self::acquire`]
    pub fn attach(&mut self) {
        self.exchange.state.fetch_or(ATTACHED, Ordering::AcqRel);
    }

    /// Stop adopting swaps; a waiting canvas completes its exchange itself
    pub fn detach(&mut self) {
        self.exchange.state.fetch_and(!ATTACHED, Ordering::AcqRel);
    }

    /// Adopt a pending frame, if any, and return the front framebuffer
    pub fn acquire(&mut self) -> &Framebuffer {
        let mut state = self.exchange.state.load(Ordering::Acquire);
        if state & PENDING != 0 {
            state = self
                .exchange
                .state
                .fetch_xor(FRONT | PENDING, Ordering::AcqRel)
                ^ (FRONT | PENDING);
        }
        // SAFETY: the front slot belongs to the reader until the next
        // adoption, which needs `&mut self` again.
        unsafe { &*self.exchange.slot(state) }
    }
}

impl Drop for FrameReader {
    fn drop(&mut self) {
        self.detach();
    }
}
