//! Segment profiles: the statistical shape of one kind of road segment.
//!
//! A [`SegmentProfile`] holds three distributions (length, direction change,
//! height change). Each draw takes a uniform value, bends it through the
//! profile's distribution curve, and lerps into the configured range.
//! Direction and height additionally draw a sign through their side curves.
//! [`ProfileSelector`] makes the weighted choice between profiles.

use serde::{Deserialize, Serialize};

use crate::core::{Error, RandomSource, Result};
use crate::math::{lerp, Curve};

/// Segment lengths never drop below this.
pub const MIN_SEGMENT_LENGTH: f32 = 1.0;

/// Closed `[min, max]` interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range containing a single value.
    pub fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Lerp from `min` to `max`.
    pub fn at(&self, t: f32) -> f32 {
        lerp(self.min, self.max, t)
    }

    fn validate(&self, what: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::Configuration(format!("{what} range is not finite")));
        }
        if self.min > self.max {
            return Err(Error::Configuration(format!(
                "{what} range min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Configuration for one segment type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentProfile {
    pub name: String,
    /// Segment length in world units
    pub length: ValueRange,
    pub length_curve: Curve,
    /// Heading change magnitude in degrees
    pub direction_offset: ValueRange,
    pub direction_offset_curve: Curve,
    /// Output < 0.5 turns left (negative), otherwise right
    pub direction_side_curve: Curve,
    /// Height change magnitude in world units
    pub height_offset: ValueRange,
    pub height_offset_curve: Curve,
    /// Output < 0.5 goes down, otherwise up
    pub height_side_curve: Curve,
}

impl Default for SegmentProfile {
    fn default() -> Self {
        Self {
            name: "segment".into(),
            length: ValueRange::new(10.0, 100.0),
            length_curve: Curve::Linear,
            direction_offset: ValueRange::ZERO,
            direction_offset_curve: Curve::Linear,
            direction_side_curve: Curve::Linear,
            height_offset: ValueRange::ZERO,
            height_offset_curve: Curve::Linear,
            height_side_curve: Curve::Linear,
        }
    }
}

impl SegmentProfile {
    /// Straight, flat profile with a fixed length.
    pub fn straight(name: &str, length: f32) -> Self {
        Self {
            name: name.into(),
            length: ValueRange::fixed(length),
            ..Default::default()
        }
    }

    /// Sample a segment length, never below [`MIN_SEGMENT_LENGTH`].
    pub fn pick_length(&self, rng: &mut impl RandomSource) -> f32 {
        let length = self.length.at(self.length_curve.evaluate(rng.next_f32()));
        length.max(MIN_SEGMENT_LENGTH)
    }

    /// Sample a signed heading change in degrees.
    pub fn pick_direction_offset(&self, rng: &mut impl RandomSource) -> f32 {
        let side = pick_side(&self.direction_side_curve, rng);
        self.direction_offset
            .at(self.direction_offset_curve.evaluate(rng.next_f32()))
            * side
    }

    /// Sample a signed height change.
    pub fn pick_height_offset(&self, rng: &mut impl RandomSource) -> f32 {
        let side = pick_side(&self.height_side_curve, rng);
        self.height_offset
            .at(self.height_offset_curve.evaluate(rng.next_f32()))
            * side
    }

    pub fn validate(&self) -> Result<()> {
        self.length.validate("length")?;
        self.direction_offset.validate("direction offset")?;
        self.height_offset.validate("height offset")?;
        let curves = [
            &self.length_curve,
            &self.direction_offset_curve,
            &self.direction_side_curve,
            &self.height_offset_curve,
            &self.height_side_curve,
        ];
        if !curves.iter().all(|c| c.is_finite()) {
            return Err(Error::Configuration(format!(
                "profile '{}' has a non-finite curve",
                self.name
            )));
        }
        Ok(())
    }
}

fn pick_side(curve: &Curve, rng: &mut impl RandomSource) -> f32 {
    if curve.evaluate(rng.next_f32()) < 0.5 { -1.0 } else { 1.0 }
}

/// A profile plus its selection weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedProfile {
    pub profile: SegmentProfile,
    pub weight: u32,
}

impl WeightedProfile {
    pub fn new(profile: SegmentProfile, weight: u32) -> Self {
        Self { profile, weight }
    }
}

/// Weighted random choice among profiles.
pub struct ProfileSelector;

impl ProfileSelector {
    /// Pick a profile with probability proportional to its weight.
    ///
    /// Draws an integer in `[0, total)` and returns the first entry whose
    /// cumulative weight is at least the draw. On a tie the earlier entry wins.
    pub fn pick<'a>(
        profiles: &'a [WeightedProfile],
        rng: &mut impl RandomSource,
    ) -> Result<&'a SegmentProfile> {
        let total = Self::total_weight(profiles)?;
        let roll = rng.next_below(total);

        let mut cumulative = 0u32;
        for entry in profiles {
            cumulative = cumulative.saturating_add(entry.weight);
            if cumulative >= roll {
                return Ok(&entry.profile);
            }
        }

        // Only reachable if the source hands back roll > total
        log::warn!("profile roll {} overshot total weight {}, using last profile", roll, total);
        profiles
            .last()
            .map(|entry| &entry.profile)
            .ok_or_else(|| Error::Configuration("profile list is empty".into()))
    }

    /// Sum of weights, failing on an empty or all-zero list.
    pub fn total_weight(profiles: &[WeightedProfile]) -> Result<u32> {
        if profiles.is_empty() {
            return Err(Error::Configuration("profile list is empty".into()));
        }
        let total = profiles
            .iter()
            .fold(0u32, |sum, entry| sum.saturating_add(entry.weight));
        if total == 0 {
            return Err(Error::Configuration("profile weights sum to zero".into()));
        }
        Ok(total)
    }

    /// Validate weights and every profile.
    pub fn validate(profiles: &[WeightedProfile]) -> Result<()> {
        Self::total_weight(profiles)?;
        profiles.iter().try_for_each(|entry| entry.profile.validate())
    }
}
