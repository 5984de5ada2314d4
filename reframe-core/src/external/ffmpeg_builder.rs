//! Video filter chain builder.
//!
//! Filters are applied in the order they are added and joined with commas
//! into a single `-vf` value.

use crate::media::Rotation;
use crate::processing::geometry::FitTransform;

/// Builder for constructing video filter chains
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform resize using the fast bilinear scaler.
    #[must_use]
    pub fn add_scale(self, width: u32, height: u32) -> Self {
        self.add_filter(format!("scale={width}:{height}:flags=fast_bilinear"))
    }

    /// Places the frame at `(x, y)` on a black canvas of `width` x `height`.
    #[must_use]
    pub fn add_pad(self, width: u32, height: u32, x: u32, y: u32) -> Self {
        self.add_filter(format!("pad={width}:{height}:{x}:{y}:color=black"))
    }

    /// Marks the output as square-pixel.
    #[must_use]
    pub fn add_square_pixels(self) -> Self {
        self.add_filter("setsar=1".to_string())
    }

    /// Turns the stored frame clockwise by `rotation`.
    #[must_use]
    pub fn add_rotation(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => self,
            Rotation::Cw90 => self.add_filter("transpose=clock".to_string()),
            Rotation::Cw180 => self.add_filter("hflip".to_string()).add_filter("vflip".to_string()),
            Rotation::Cw270 => self.add_filter("transpose=cclock".to_string()),
        }
    }

    /// Scale, pad and square-pixel steps for a fit transform, preceded by an
    /// explicit rotation when one is given.
    ///
    /// `rotate` must only be set when ffmpeg's own autorotation is disabled.
    #[must_use]
    pub fn add_fit(self, fit: &FitTransform, rotate: Option<Rotation>) -> Self {
        self.add_rotation(rotate.unwrap_or_default())
            .add_scale(fit.scaled_width, fit.scaled_height)
            .add_pad(
                FitTransform::TARGET_WIDTH,
                FitTransform::TARGET_HEIGHT,
                fit.pad_left,
                fit.pad_top,
            )
            .add_square_pixels()
    }

    /// Adds a custom filter; empty strings are ignored.
    #[must_use]
    pub fn add_filter(mut self, filter: String) -> Self {
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Joins the chain, or `None` when nothing was added.
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
