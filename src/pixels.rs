//! The seam to whatever actually drives the lights.
//!
//! The core only resolves indices; writing colors goes through a
//! [`PixelBuffer`], which owns both the color model and the transport.

/// A strip of addressable pixels.
pub trait PixelBuffer {
    /// Color value understood by the strip.
    type Color: Copy + Default;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<Self::Color>;

    /// Set one pixel. Indices past the end are ignored.
    fn set(&mut self, index: usize, color: Self::Color);

    fn fill(&mut self, color: Self::Color) {
        for index in 0..self.len() {
            self.set(index, color);
        }
    }

    /// Push pending writes to the lights.
    fn show(&mut self) {}
}

/// In-memory pixel strip, used when no hardware is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPixels<C> {
    pixels: Vec<C>,
    shows: usize,
}

impl<C: Copy + Default> MemoryPixels<C> {
    pub fn new(len: usize) -> Self {
        MemoryPixels {
            pixels: vec![C::default(); len],
            shows: 0,
        }
    }

    pub fn as_slice(&self) -> &[C] {
        &self.pixels
    }

    /// Number of times [`PixelBuffer::show`] has been called.
    pub fn shows(&self) -> usize {
        self.shows
    }
}

impl<C: Copy + Default> PixelBuffer for MemoryPixels<C> {
    type Color = C;

    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn get(&self, index: usize) -> Option<C> {
        self.pixels.get(index).copied()
    }

    fn set(&mut self, index: usize, color: C) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn fill(&mut self, color: C) {
        self.pixels.fill(color);
    }

    fn show(&mut self) {
        self.shows += 1;
    }
}
