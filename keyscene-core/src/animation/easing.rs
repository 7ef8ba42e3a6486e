//! Easing curves used to shape sub-frame interpolation

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::AnimationError;

/// Easing function selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Half cosine wave
    Sine,
    Quad,
    Cubic,
    Quart,
    /// Exponential in/out, exact at both ends
    Expo,
    /// Quarter circles joined at the midpoint
    Circ,
}

impl Easing {
    pub const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::Sine,
        Easing::Quad,
        Easing::Cubic,
        Easing::Quart,
        Easing::Expo,
        Easing::Circ,
    ];

    /// Remap `x` (clamped to `[0, 1]`) through the curve
    pub fn apply(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);

        match self {
            Easing::Linear => x,
            Easing::Sine => -((PI * x).cos() - 1.0) / 2.0,
            Easing::Quad => ease_in_out_pow(x, 2),
            Easing::Cubic => ease_in_out_pow(x, 3),
            Easing::Quart => ease_in_out_pow(x, 4),
            Easing::Expo => ease_in_out_expo(x),
            Easing::Circ => ease_in_out_circ(x),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Sine => "sine",
            Easing::Quad => "quad",
            Easing::Cubic => "cubic",
            Easing::Quart => "quart",
            Easing::Expo => "expo",
            Easing::Circ => "circ",
        }
    }
}

/// Symmetric power curve: `2^(n-1)·x^n` then its mirror
fn ease_in_out_pow(x: f64, n: i32) -> f64 {
    if x < 0.5 {
        2f64.powi(n - 1) * x.powi(n)
    } else {
        1.0 - (-2.0 * x + 2.0).powi(n) / 2.0
    }
}

fn ease_in_out_expo(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else if x == 1.0 {
        1.0
    } else if x < 0.5 {
        2f64.powf(20.0 * x - 10.0) / 2.0
    } else {
        (2.0 - 2f64.powf(-20.0 * x + 10.0)) / 2.0
    }
}

fn ease_in_out_circ(x: f64) -> f64 {
    if x < 0.5 {
        (1.0 - (1.0 - (2.0 * x).powi(2)).sqrt()) / 2.0
    } else {
        ((1.0 - (-2.0 * x + 2.0).powi(2)).sqrt() + 1.0) / 2.0
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|ease| ease.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnimationError::UnknownEasing(s.to_string()))
    }
}
