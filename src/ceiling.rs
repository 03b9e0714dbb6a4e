//! A layer between the pixel strip and light scripts that hides the
//! coordinate math.
//!
//! A [`Ceiling`] owns the strip, exactly one active [`Indexing`] strategy and
//! the most recently built spatial index, which later strategies for the same
//! layout reuse instead of remapping.

use crate::config::CeilingConfig;
use crate::error::Result;
use crate::indexing::{
    CartesianIndexing, FloatCartesianIndexing, FloatPolarIndexing, Indexing, Key, LinearIndexing,
    PolarIndexing, Resolved, RowIndexing, Strategy,
};
use crate::layout::Layout;
use crate::pixels::PixelBuffer;
use crate::space::{LedSpace, SharedSpace};

pub struct Ceiling<P: PixelBuffer> {
    pixels: P,
    indexing: Indexing,
    config: CeilingConfig,
    cached_space: Option<SharedSpace>,
}

impl<P: PixelBuffer> Ceiling<P> {
    /// Ceiling over `pixels`, starting with linear indexing.
    pub fn new(pixels: P, config: CeilingConfig) -> Result<Self> {
        config.validate()?;
        let indexing = LinearIndexing::new(pixels.len()).into();
        Ok(Ceiling {
            pixels,
            indexing,
            config,
            cached_space: None,
        })
    }

    pub fn config(&self) -> &CeilingConfig {
        &self.config
    }

    pub fn pixels(&self) -> &P {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut P {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> P {
        self.pixels
    }

    // ===== Getting / Setting =====

    /// Resolve `key` through the active strategy.
    pub fn get(&mut self, key: Key) -> Result<Resolved> {
        self.indexing.get(&key)
    }

    /// Color every light `key` resolves to. Returns how many pixels were written.
    pub fn set(&mut self, key: Key, color: P::Color) -> Result<usize> {
        self.indexing.set(&mut self.pixels, &key, color)
    }

    pub fn fill(&mut self, color: P::Color) {
        self.pixels.fill(color);
    }

    /// Set every pixel to the default (off) color, optionally pushing it out.
    pub fn clear(&mut self, show: bool) {
        self.fill(P::Color::default());
        if show {
            self.show();
        }
    }

    pub fn show(&mut self) {
        self.pixels.show();
    }

    /// Row layout, when row indexing is active.
    pub fn rows(&self) -> Option<&Layout> {
        self.indexing.rows()
    }

    pub fn indexing(&self) -> &Indexing {
        &self.indexing
    }

    // ===== Transfer =====

    /// Detach every spatial index this ceiling holds so it can be sent to
    /// another thread or serialized. Indices rebuild on their next query.
    pub fn prepare_to_send(&mut self) {
        log::debug!("preparing {} indexing to send", self.indexing.name());
        self.indexing.prepare_to_send();
        if let Some(space) = &self.cached_space {
            space.lock().detach();
        }
    }

    // ===== Indexing =====

    /// Spatial index for `layout`, reusing the cached one when the layout matches.
    pub fn shared_space(&mut self, layout: &Layout) -> Result<SharedSpace> {
        if let Some(space) = &self.cached_space {
            if space.lock().layout() == Some(layout) {
                log::trace!("reusing spatial index for {} lights", layout.light_count());
                return Ok(space.clone());
            }
        }

        let mut space = LedSpace::with_cache_capacity(self.config.cache_capacity);
        space.set_circle_points(self.config.circle_points)?;
        space.map_in_zigzag(layout);
        let space = SharedSpace::new(space);
        self.cached_space = Some(space.clone());
        Ok(space)
    }

    /// Light closest to `(x, y)` within the configured `max_distance`,
    /// whatever strategy is active.
    pub fn nearest(&mut self, x: f64, y: f64) -> Result<Option<usize>> {
        let max_distance = self.config.max_distance;
        let space = self.configured_space()?;
        let nearest = space.lock().nearest_index(x, y, max_distance);
        Ok(nearest)
    }

    /// Make `indexing` the active strategy.
    pub fn use_indexing(&mut self, indexing: impl Into<Indexing>) {
        self.indexing = indexing.into();
        log::debug!("using {} indexing", self.indexing.name());
    }

    /// Run `block` with `indexing` active, then restore the previous strategy.
    ///
    /// The previous strategy comes back however `block` exits, including by
    /// panic.
    pub fn with_indexing<R>(
        &mut self,
        indexing: impl Into<Indexing>,
        block: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = std::mem::replace(&mut self.indexing, indexing.into());
        let scope = IndexingScope {
            ceiling: self,
            previous: Some(previous),
        };
        block(&mut *scope.ceiling)
    }

    pub fn linear(&self) -> LinearIndexing {
        LinearIndexing::new(self.pixels.len())
    }

    pub fn row(&self) -> RowIndexing {
        RowIndexing::new(self.config.layout.clone())
    }

    pub fn cartesian(&mut self) -> Result<CartesianIndexing> {
        let space = self.configured_space()?;
        CartesianIndexing::new(space, self.config.search_range)
    }

    pub fn polar(&mut self, origin: (f64, f64)) -> Result<PolarIndexing> {
        let space = self.configured_space()?;
        PolarIndexing::new(space, origin, self.config.search_range)
    }

    pub fn float_cartesian(&mut self) -> Result<FloatCartesianIndexing> {
        let space = self.configured_space()?;
        FloatCartesianIndexing::new(space, self.config.effect_radius)
    }

    pub fn float_polar(&mut self, origin: (f64, f64)) -> Result<FloatPolarIndexing> {
        let space = self.configured_space()?;
        FloatPolarIndexing::new(space, origin, self.config.effect_radius)
    }

    pub fn use_linear(&mut self) {
        let linear = self.linear();
        self.use_indexing(linear);
    }

    pub fn use_row(&mut self) {
        let row = self.row();
        self.use_indexing(row);
    }

    pub fn use_cartesian(&mut self) -> Result<()> {
        let cartesian = self.cartesian()?;
        self.use_indexing(cartesian);
        Ok(())
    }

    pub fn use_polar(&mut self, origin: (f64, f64)) -> Result<()> {
        let polar = self.polar(origin)?;
        self.use_indexing(polar);
        Ok(())
    }

    pub fn use_float_cartesian(&mut self) -> Result<()> {
        let float_cartesian = self.float_cartesian()?;
        self.use_indexing(float_cartesian);
        Ok(())
    }

    pub fn use_float_polar(&mut self, origin: (f64, f64)) -> Result<()> {
        let float_polar = self.float_polar(origin)?;
        self.use_indexing(float_polar);
        Ok(())
    }

    pub fn with_linear<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> R {
        let linear = self.linear();
        self.with_indexing(linear, block)
    }

    pub fn with_row<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> R {
        let row = self.row();
        self.with_indexing(row, block)
    }

    pub fn with_cartesian<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let cartesian = self.cartesian()?;
        Ok(self.with_indexing(cartesian, block))
    }

    pub fn with_polar<R>(
        &mut self,
        origin: (f64, f64),
        block: impl FnOnce(&mut Self) -> R,
    ) -> Result<R> {
        let polar = self.polar(origin)?;
        Ok(self.with_indexing(polar, block))
    }

    pub fn with_float_cartesian<R>(&mut self, block: impl FnOnce(&mut Self) -> R) -> Result<R> {
        let float_cartesian = self.float_cartesian()?;
        Ok(self.with_indexing(float_cartesian, block))
    }

    pub fn with_float_polar<R>(
        &mut self,
        origin: (f64, f64),
        block: impl FnOnce(&mut Self) -> R,
    ) -> Result<R> {
        let float_polar = self.float_polar(origin)?;
        Ok(self.with_indexing(float_polar, block))
    }

    fn configured_space(&mut self) -> Result<SharedSpace> {
        let layout = self.config.layout.clone();
        self.shared_space(&layout)
    }
}

/// Puts the previous strategy back when dropped.
struct IndexingScope<'a, P: PixelBuffer> {
    ceiling: &'a mut Ceiling<P>,
    previous: Option<Indexing>,
}

impl<P: PixelBuffer> Drop for IndexingScope<'_, P> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            log::debug!(
                "restoring {} indexing after {}",
                previous.name(),
                self.ceiling.indexing.name()
            );
            self.ceiling.indexing = previous;
        }
    }
}
