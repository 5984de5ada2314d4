//! Media metadata types.
//!
//! `MediaProfile` is what the prober extracts from one source file. It is
//! created right before geometry resolution and never mutated afterwards.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Playback rotation declared by the container, normalized to quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalizes any angle in degrees to the nearest quarter turn.
    ///
    /// Display matrices report counter-clockwise angles such as `-90`, which
    /// land on 270 here. Non-finite input yields `Rotation::None`.
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Rotation::None;
        }
        let quarter_turns = (degrees / 90.0).round() as i64;
        match quarter_turns.rem_euclid(4) {
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            3 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub const fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// True when the displayed frame has width and height exchanged.
    pub const fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Error returned when a rotation is not one of 0, 90, 180 or 270.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationParseError {
    invalid_value: String,
}

impl fmt::Display for RotationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid rotation '{}'. Valid options: 0, 90, 180, 270",
            self.invalid_value
        )
    }
}

impl std::error::Error for RotationParseError {}

impl FromStr for Rotation {
    type Err = RotationParseError;

    /// Accepts exact clockwise quarter turns in degrees.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Rotation::None),
            "90" => Ok(Rotation::Cw90),
            "180" => Ok(Rotation::Cw180),
            "270" => Ok(Rotation::Cw270),
            _ => Err(RotationParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// A frame rate as the exact rational ffprobe reports, e.g. `30000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Parses `"num/den"` or a plain integer. Zero numerators or
    /// denominators (ffprobe's `0/0` for unknown) are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (num, den) = match value.split_once('/') {
            Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
            None => (value.parse().ok()?, 1),
        };
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Stream parameters of one probed source file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MediaProfile {
    pub codec_name: Option<String>,
    pub coded_width: u32,
    pub coded_height: u32,
    pub rotation: Rotation,
    /// `(num, den)` pixel aspect; `None` means square pixels
    pub sample_aspect_ratio: Option<(u32, u32)>,
    pub frame_rate: Option<FrameRate>,
    /// Video stream bit rate in bits per second
    pub bit_rate: Option<u64>,
    pub pixel_format: Option<String>,
    pub color_space: Option<String>,
    pub color_range: Option<String>,
    pub color_transfer: Option<String>,
    pub color_primaries: Option<String>,
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
    pub audio_codec: Option<String>,
}

/// Display-corrected frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisualDimensions {
    pub display_width: u32,
    pub display_height: u32,
}

impl VisualDimensions {
    /// Applies the sample aspect ratio to the stored width, then swaps the
    /// axes for quarter-turn rotations.
    pub fn from_profile(profile: &MediaProfile) -> Self {
        Self::with_rotation(profile, profile.rotation)
    }

    /// Same as [`from_profile`](Self::from_profile) but with `rotation` in
    /// place of the probed one.
    pub fn with_rotation(profile: &MediaProfile, rotation: Rotation) -> Self {
        let mut width = u64::from(profile.coded_width.max(1));
        let height = profile.coded_height.max(1);

        if let Some((num, den)) = profile.sample_aspect_ratio {
            if num > 0 && den > 0 && num != den {
                let (num, den) = (u64::from(num), u64::from(den));
                width = ((width * num * 2 + den) / (den * 2)).max(1);
            }
        }
        let width = u32::try_from(width).unwrap_or(u32::MAX);

        if rotation.swaps_dimensions() {
            Self {
                display_width: height,
                display_height: width,
            }
        } else {
            Self {
                display_width: width,
                display_height: height,
            }
        }
    }
}
