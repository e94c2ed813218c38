//! Unit-interval curves used to shape random draws and transitions.
//!
//! A [`Curve`] maps `x` in `[0, 1]` to a finite value. Profiles use curves to
//! bias where a uniform draw lands inside a range, and the generator uses one
//! to ease height changes across a segment. [`KeyframeCurve`] is the sampled
//! variant: sorted `(x, y)` keys with linear interpolation and flat
//! extrapolation past the first and last key.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// KeyframeCurve
// ---------------------------------------------------------------------------

/// Piecewise-linear curve through sorted keyframes.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeCurve {
    keys: Vec<(f32, f32)>,
}

impl KeyframeCurve {
    /// Create a curve from unsorted keys. Keys are sorted by `x`.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Sample the curve at `x`. An empty curve evaluates to 0.
    pub fn sample(&self, x: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };

        if self.keys.len() == 1 || x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        // First key strictly after x; guaranteed to exist and be > 0 here
        let upper = self.keys.iter().position(|k| k.0 > x).unwrap_or(self.keys.len() - 1);
        let (x_a, y_a) = self.keys[upper - 1];
        let (x_b, y_b) = self.keys[upper];
        let span = x_b - x_a;
        if span < 1e-6 {
            return y_a;
        }
        y_a + (y_b - y_a) * ((x - x_a) / span)
    }
}

impl Serialize for KeyframeCurve {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyframeCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, f32)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

// ---------------------------------------------------------------------------
// Curve
// ---------------------------------------------------------------------------

/// Evaluable `[0, 1] -> value` mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// `y = x`
    #[default]
    Linear,
    /// `y = value` everywhere
    Constant { value: f32 },
    /// Smoothstep from (0, 0) to (1, 1) with flat ends
    EaseInOut,
    /// Piecewise-linear keyframes
    Sampled { keys: KeyframeCurve },
}

impl Curve {
    pub fn constant(value: f32) -> Self {
        Self::Constant { value }
    }

    pub fn sampled(keys: Vec<(f32, f32)>) -> Self {
        Self::Sampled { keys: KeyframeCurve::new(keys) }
    }

    /// Evaluate at `x`. Inputs outside `[0, 1]` are clamped for the analytic
    /// variants; sampled curves hold their end values.
    pub fn evaluate(&self, x: f32) -> f32 {
        match self {
            Curve::Linear => x.clamp(0.0, 1.0),
            Curve::Constant { value } => *value,
            Curve::EaseInOut => {
                let t = x.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            Curve::Sampled { keys } => keys.sample(x),
        }
    }

    /// True if every key/constant is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Curve::Linear | Curve::EaseInOut => true,
            Curve::Constant { value } => value.is_finite(),
            Curve::Sampled { keys } => keys
                .keys()
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
