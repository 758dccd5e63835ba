//! RGB pixel grid written by the application

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::color::Rgb;

/// Bytes per pixel of a packed RGB888 buffer
const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferError {
    OutOfBounds { x: i32, y: i32 },
}

impl fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { x, y } => write!(f, "pixel ({x}, {y}) is outside the canvas"),
        }
    }
}

impl core::error::Error for FramebufferError {}

/// Rectangle given by two inclusive corners, in any order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Half-open column and row ranges clipped to a `width × height` canvas,
    /// or `None` when the rectangle misses the canvas entirely.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn clip(self, width: usize, height: usize) -> Option<(usize, usize, usize, usize)> {
        let (left, right) = (self.x0.min(self.x1), self.x0.max(self.x1));
        let (top, bottom) = (self.y0.min(self.y1), self.y0.max(self.y1));
        let (width, height) = (width as i64, height as i64);

        let left = i64::from(left).max(0);
        let top = i64::from(top).max(0);
        let right = (i64::from(right) + 1).min(width);
        let bottom = (i64::from(bottom) + 1).min(height);
        if left >= right || top >= bottom {
            return None;
        }
        Some((left as usize, right as usize, top as usize, bottom as usize))
    }
}

/// Row-major pixel grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    /// Create a black framebuffer
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, x: i32, y: i32) -> Result<usize, FramebufferError> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(FramebufferError::OutOfBounds { x, y });
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<(), FramebufferError> {
        let index = self.index(x, y)?;
        self.pixels[index] = color;
        Ok(())
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Rgb, FramebufferError> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Fill `rect` (or the whole canvas) with `color`, clipping to the canvas
    pub fn fill(&mut self, rect: Option<Rect>, color: Rgb) {
        let Some(rect) = rect else {
            self.pixels.fill(color);
            return;
        };
        let Some((left, right, top, bottom)) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in top..bottom {
            let row = y * self.width;
            self.pixels[row + left..row + right].fill(color);
        }
    }

    /// Reset `rect` (or the whole canvas) to black
    pub fn clear(&mut self, rect: Option<Rect>) {
        self.fill(rect, Rgb::default());
    }

    /// Copy a packed RGB888 image into the top-left corner
    ///
    /// The image is clipped to the canvas; a buffer shorter than
    /// `width × height × 3` bytes only copies the complete pixels it holds.
    pub fn draw_rgb_buffer(&mut self, buffer: &[u8], width: usize, height: usize) {
        let columns = width.min(self.width);
        let rows = height.min(self.height);
        for y in 0..rows {
            for x in 0..columns {
                let offset = (y * width + x) * BYTES_PER_PIXEL;
                let Some(pixel) = buffer.get(offset..offset + BYTES_PER_PIXEL) else {
                    return;
                };
                self.pixels[y * self.width + x] = Rgb {
                    r: pixel[0],
                    g: pixel[1],
                    b: pixel[2],
                };
            }
        }
    }
}
