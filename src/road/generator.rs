//! Endless centerline generator.
//!
//! [`PathSegmentGenerator`] walks one [`ActiveSegment`] at a time. When a
//! step completes the segment, the next one is sampled immediately from the
//! current position/heading/height, so the returned point is the last point
//! of the finished segment and the new segment takes over on the next call.

use serde::{Deserialize, Serialize};

use crate::core::{Error, RandomSource, Result, Vec3};
use crate::math::Curve;

use super::profile::{ProfileSelector, WeightedProfile};
use super::segment::ActiveSegment;

/// Parameters for the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Profiles to pick segments from
    pub profiles: Vec<WeightedProfile>,
    /// Distance between consecutive centerline points
    pub step_size: f32,
    /// Shapes the height transition over each segment
    pub height_change_curve: Curve,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            profiles: super::config::default_profiles(),
            step_size: 3.0,
            height_change_curve: Curve::EaseInOut,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(Error::Configuration(format!(
                "step size must be positive, got {}",
                self.step_size
            )));
        }
        if !self.height_change_curve.is_finite() {
            return Err(Error::Configuration("height change curve is not finite".into()));
        }
        ProfileSelector::validate(&self.profiles)
    }
}

/// Generator state.
#[derive(Clone, Debug, PartialEq)]
pub enum GeneratorState {
    NoActiveSegment,
    InSegment(ActiveSegment),
}

/// Stateful producer of successive centerline points.
pub struct PathSegmentGenerator<R: RandomSource> {
    config: GeneratorConfig,
    rng: R,
    state: GeneratorState,
    segments_started: u64,
}

impl<R: RandomSource> PathSegmentGenerator<R> {
    /// Create an uninitialized generator. Fails on invalid configuration.
    pub fn new(config: GeneratorConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            state: GeneratorState::NoActiveSegment,
            segments_started: 0,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn step_size(&self) -> f32 {
        self.config.step_size
    }

    /// Number of segments sampled so far, including the current one.
    pub fn segments_started(&self) -> u64 {
        self.segments_started
    }

    /// The live segment, if initialized.
    pub fn active_segment(&self) -> Option<&ActiveSegment> {
        match &self.state {
            GeneratorState::InSegment(segment) => Some(segment),
            GeneratorState::NoActiveSegment => None,
        }
    }

    /// Sample the first segment. Calling again restarts from the new state.
    pub fn initialize(&mut self, start_position: Vec3, start_direction: f32) -> Result<()> {
        let segment = self.sample_segment(start_position, start_direction)?;
        self.state = GeneratorState::InSegment(segment);
        Ok(())
    }

    /// Advance one step and return the new centerline point.
    pub fn step(&mut self) -> Result<Vec3> {
        let GeneratorState::InSegment(segment) = &mut self.state else {
            return Err(Error::InvalidState("step() called before initialize()".into()));
        };

        let position = segment.advance(&self.config.height_change_curve);
        log::trace!(
            "step -> ({:.2}, {:.2}, {:.2}) t={:.3}",
            position.x, position.y, position.z, segment.progress()
        );

        if segment.is_complete() {
            let direction = segment.direction();
            let next = self.sample_segment(position, direction)?;
            self.state = GeneratorState::InSegment(next);
        }

        Ok(position)
    }

    fn sample_segment(&mut self, start_position: Vec3, start_direction: f32) -> Result<ActiveSegment> {
        let profile = ProfileSelector::pick(&self.config.profiles, &mut self.rng)?;
        let segment = ActiveSegment::sample(
            profile,
            self.config.step_size,
            start_position,
            start_direction,
            &mut self.rng,
        );
        self.segments_started += 1;
        log::debug!(
            "segment #{} '{}': length {:.1}, turn {:.1} deg, climb {:.2}",
            self.segments_started,
            profile.name,
            segment.total_length,
            segment.direction_offset,
            segment.height_offset
        );
        Ok(segment)
    }
}
