//! Easing curves evaluated over normalized progress
//!
//! Used for difficulty ramps (balance drift over the minigame's time budget)
//! and for cosmetic motion (throw flight).

use serde::{Deserialize, Serialize};

/// Easing function type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant rate
    #[default]
    Linear,
    /// Slow start (quarter cosine)
    SineIn,
    /// Slow end (quarter sine)
    SineOut,
    /// Quadratic slow start
    QuadIn,
    /// Slow start and end
    SmoothStep,
}

impl Easing {
    /// Apply to `t`, clamped to [0, 1]
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        use std::f32::consts::FRAC_PI_2;

        let t = crate::finite_or_zero(t).clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::SineOut => (t * FRAC_PI_2).sin(),
            Easing::QuadIn => t * t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A value ramp from `start` (t = 0) to `end` (t = 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub start: f32,
    pub end: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl Curve {
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            easing: Easing::Linear,
        }
    }

    pub fn ease_in_out(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            easing: Easing::SmoothStep,
        }
    }

    /// Evaluate at normalized time `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        crate::lerp(self.start, self.end, self.easing.apply(t))
    }
}
