//! The live road segment being walked by the generator.

use crate::core::{RandomSource, Vec3};
use crate::math::{heading_vector, lerp, lerp_angle, Curve};

use super::profile::SegmentProfile;

/// One sampled segment: a start state plus a length, heading change and
/// height change, advanced in fixed steps.
///
/// Direction and height are recomputed from the start state every step
/// using the progress fraction `t = accumulated / total`, so rounding does
/// not compound across steps.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSegment {
    pub start_position: Vec3,
    /// Degrees around +Y
    pub start_direction: f32,
    pub start_height: f32,
    pub total_length: f32,
    pub direction_offset: f32,
    pub height_offset: f32,
    pub step_size: f32,
    pub accumulated_distance: f32,

    position: Vec3,
    direction: f32,
    height: f32,
}

impl ActiveSegment {
    /// Sample a new segment from `profile` starting at the given state.
    ///
    /// Draw order: length, direction side + magnitude, height side + magnitude.
    pub fn sample(
        profile: &SegmentProfile,
        step_size: f32,
        start_position: Vec3,
        start_direction: f32,
        rng: &mut impl RandomSource,
    ) -> Self {
        let total_length = profile.pick_length(rng);
        let direction_offset = profile.pick_direction_offset(rng);
        let height_offset = profile.pick_height_offset(rng);
        Self::new(
            start_position,
            start_direction,
            total_length,
            direction_offset,
            height_offset,
            step_size,
        )
    }

    /// Segment with explicit parameters.
    pub fn new(
        start_position: Vec3,
        start_direction: f32,
        total_length: f32,
        direction_offset: f32,
        height_offset: f32,
        step_size: f32,
    ) -> Self {
        Self {
            start_position,
            start_direction,
            start_height: start_position.y,
            total_length,
            direction_offset,
            height_offset,
            step_size,
            accumulated_distance: 0.0,
            position: start_position,
            direction: start_direction,
            height: start_position.y,
        }
    }

    /// Progress fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.total_length <= 0.0 {
            return 1.0;
        }
        (self.accumulated_distance / self.total_length).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.accumulated_distance >= self.total_length
    }

    /// Current heading in degrees.
    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Current centerline point, with height substituted in.
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position.x, self.height, self.position.z)
    }

    /// Advance one step and return the new centerline point.
    ///
    /// Distance is capped at `total_length`, but the horizontal move is always
    /// a full `step_size` along the new heading.
    pub fn advance(&mut self, height_curve: &Curve) -> Vec3 {
        self.accumulated_distance = (self.accumulated_distance + self.step_size).min(self.total_length);
        let t = self.progress();

        self.direction = lerp_angle(self.start_direction, self.start_direction + self.direction_offset, t);
        self.height = lerp(
            self.start_height,
            self.start_height + self.height_offset,
            height_curve.evaluate(t).clamp(0.0, 1.0),
        );
        self.position += heading_vector(self.direction) * self.step_size;

        self.position()
    }
}
