use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Easing presets for cluster transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInOutSine,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -(((PI * t).cos() - 1.0) / 2.0),
        }
    }
}

/// Maps elapsed time fraction to transition progress `v`.
///
/// Either one of the [`EasingFunction`] presets or a caller supplied pure
/// function. Custom functions are expected to map `[0, 1]` onto `[0, 1]`;
/// their output is clamped to that range.
#[derive(Clone, Deserialize)]
#[serde(from = "EasingFunction")]
pub enum Interpolator {
    Easing(EasingFunction),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Interpolator {
    pub fn linear() -> Self {
        Self::Easing(EasingFunction::Linear)
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Progress for a time fraction in `[0, 1]`
    pub fn apply(&self, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Interpolator::Easing(easing) => easing.apply(fraction),
            Interpolator::Custom(f) => {
                let v = f(fraction);
                if v.is_nan() {
                    fraction
                } else {
                    v.clamp(0.0, 1.0)
                }
            }
        }
    }

    /// Progress after `elapsed_ms` of a `duration_ms` long transition.
    ///
    /// The terminal sample is pinned to exactly `1.0` so markers land on
    /// their destination regardless of the curve.
    pub fn progress(&self, elapsed_ms: u64, duration_ms: u64) -> f64 {
        if duration_ms == 0 || elapsed_ms >= duration_ms {
            return 1.0;
        }
        self.apply(elapsed_ms as f64 / duration_ms as f64)
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::linear()
    }
}

impl From<EasingFunction> for Interpolator {
    fn from(easing: EasingFunction) -> Self {
        Self::Easing(easing)
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolator::Easing(easing) => f.debug_tuple("Easing").field(easing).finish(),
            Interpolator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
