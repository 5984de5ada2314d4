// ============================================================================
// reframe-core/src/processing/geometry.rs
// ============================================================================
//
// FIT GEOMETRY: Scale-then-pad placement on the 1080x1920 canvas
//
// Given display dimensions, decides whether the frame is limited by the
// canvas width or height, scales it uniformly to touch that side, and splits
// the leftover space evenly into black bars.
//
// All ratios are compared by cross-multiplying in u64, so there is no
// floating-point drift. Scaled sides are rounded half up, then down to an even
// number because 4:2:0 chroma subsampling needs even dimensions.

use crate::config::{TARGET_HEIGHT, TARGET_WIDTH};
use crate::media::{MediaProfile, Rotation, VisualDimensions};

use serde::Serialize;

/// Where the scaled frame sits on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitTransform {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub pad_top: u32,
    pub pad_bottom: u32,
    pub pad_left: u32,
    pub pad_right: u32,
}

impl FitTransform {
    pub const TARGET_WIDTH: u32 = TARGET_WIDTH;
    pub const TARGET_HEIGHT: u32 = TARGET_HEIGHT;

    /// True when any black bar is added.
    pub fn is_padded(&self) -> bool {
        self.pad_top + self.pad_bottom + self.pad_left + self.pad_right > 0
    }
}

/// Display-corrected dimensions of a probed source.
///
/// A manual `rotate` replaces the probed rotation entirely.
pub fn visual_dimensions(profile: &MediaProfile, rotate: Option<Rotation>) -> VisualDimensions {
    VisualDimensions::with_rotation(profile, rotate.unwrap_or(profile.rotation))
}

/// Fit transform for a probed source, rotation and pixel aspect included.
pub fn resolve_profile(profile: &MediaProfile, rotate: Option<Rotation>) -> FitTransform {
    let dims = visual_dimensions(profile, rotate);
    resolve_fit(dims.display_width, dims.display_height)
}

/// Computes the scale and padding that fit `display_width` x
/// `display_height` inside the canvas without cropping.
///
/// Sources exactly at 9:16 are width-constrained and get no padding. Zero
/// inputs are treated as one pixel.
pub fn resolve_fit(display_width: u32, display_height: u32) -> FitTransform {
    let dw = u64::from(display_width.max(1));
    let dh = u64::from(display_height.max(1));
    let canvas_w = u64::from(TARGET_WIDTH);
    let canvas_h = u64::from(TARGET_HEIGHT);

    let width_constrained = dw * canvas_h >= dh * canvas_w;

    if width_constrained {
        let scaled_height = even_side(round_ratio(canvas_w * dh, dw), TARGET_HEIGHT);
        let (pad_top, pad_bottom) = split_padding(TARGET_HEIGHT - scaled_height);
        FitTransform {
            scaled_width: TARGET_WIDTH,
            scaled_height,
            pad_top,
            pad_bottom,
            pad_left: 0,
            pad_right: 0,
        }
    } else {
        let scaled_width = even_side(round_ratio(canvas_h * dw, dh), TARGET_WIDTH);
        let (pad_left, pad_right) = split_padding(TARGET_WIDTH - scaled_width);
        FitTransform {
            scaled_width,
            scaled_height: TARGET_HEIGHT,
            pad_top: 0,
            pad_bottom: 0,
            pad_left,
            pad_right,
        }
    }
}

/// `num / den` rounded half up.
fn round_ratio(num: u64, den: u64) -> u64 {
    (2 * num + den) / (2 * den)
}

/// Rounds down to even, then keeps the side within `[2, limit]`.
fn even_side(value: u64, limit: u32) -> u32 {
    let even = value - value % 2;
    let clamped = even.clamp(2, u64::from(limit));
    // limit is even, so the clamp keeps parity
    clamped as u32
}

/// First half rounded down; the odd pixel, if any, goes to the second side.
fn split_padding(total: u32) -> (u32, u32) {
    let first = total / 2;
    (first, total - first)
}
