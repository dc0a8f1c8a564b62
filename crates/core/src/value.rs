//! Pointer speed values.
//!
//! The desktop stores pointer speed as a double in `[-1.0, 1.0]`. The panel
//! works at one-decimal resolution, so every value the user produces is
//! clamped and rounded through [`round_to_tenth`]. Values read back from the
//! store are kept as-is until the user edits them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Round to the nearest tenth. Negative zero is normalized to `0.0`.
///
/// Ties round away from zero, so `0.25` becomes `0.3` and `-0.25` becomes `-0.3`.
///
/// Shared by clamping and display formatting so the slider and the status
/// line never disagree on what "0.3" is.
pub fn round_to_tenth(v: f32) -> f32 {
    (v * 10.0).round() / 10.0 + 0.0
}

/// A pointer speed setting.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceValue(f32);

impl PreferenceValue {
    pub const MIN: f32 = -1.0;
    pub const MAX: f32 = 1.0;
    pub const STEP: f32 = 0.1;

    /// Domain default, used when the store cannot be read and on reset.
    pub const DEFAULT: PreferenceValue = PreferenceValue(0.0);

    /// Clamp to `[MIN, MAX]` and round to the nearest tenth.
    ///
    /// Returns `None` for NaN, which has no nearest legal value.
    pub fn clamped(raw: f32) -> Option<Self> {
        if raw.is_nan() {
            return None;
        }
        Some(Self(round_to_tenth(raw.clamp(Self::MIN, Self::MAX))))
    }

    /// Wrap a value read from the store without clamping or rounding.
    pub fn from_store(raw: f32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn is_in_range(self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }

    /// Slider notch for this value: 0 at `MIN`, 20 at `MAX`.
    /// Out-of-range values pin to the nearest end.
    pub fn notch(self) -> usize {
        let clamped = self.0.clamp(Self::MIN, Self::MAX);
        ((clamped - Self::MIN) / Self::STEP).round() as usize
    }

    /// Number of notches on the slider (inclusive of both ends).
    pub const fn notch_count() -> usize {
        21
    }
}

impl Default for PreferenceValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", round_to_tenth(self.0))
    }
}
