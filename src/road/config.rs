//! Road configuration: everything a generation run reads.
//!
//! Loaded from JSON. Missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec3};
use crate::math::Curve;
use crate::mesh::MeshSettings;
use crate::path::NormalMode;

use super::generator::GeneratorConfig;
use super::profile::{SegmentProfile, ValueRange, WeightedProfile};

/// Top-level configuration for a road stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Seed for reproducible roads; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Centerline points kept in the sliding window
    pub max_points: usize,
    /// Texture repeats per point; the road material's V scale is
    /// `max_points * step_tiling`
    pub step_tiling: f32,
    /// Where the road starts
    pub start_position: Vec3,
    /// Initial heading in degrees (0 = +Z)
    pub start_direction: f32,
    /// Lateral normal derivation for the centerline
    pub normal_mode: NormalMode,
    /// Join the window's last point back to its first
    pub closed_path: bool,
    pub generator: GeneratorConfig,
    pub mesh: MeshSettings,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_points: 16,
            step_tiling: 10.0,
            start_position: Vec3::ZERO,
            start_direction: 0.0,
            normal_mode: NormalMode::Horizontal,
            closed_path: false,
            generator: GeneratorConfig::default(),
            mesh: MeshSettings::default(),
        }
    }
}

impl RoadConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RoadConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded road config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_points < 2 {
            return Err(Error::Configuration(format!(
                "max_points must be at least 2, got {}",
                self.max_points
            )));
        }
        if !self.start_position.is_finite() || !self.start_direction.is_finite() {
            return Err(Error::Configuration("start state is not finite".into()));
        }
        if !self.step_tiling.is_finite() {
            return Err(Error::Configuration("step_tiling is not finite".into()));
        }
        self.normal_mode.validate()?;
        self.generator.validate()?;
        self.mesh.validate()
    }

    /// V-axis texture scale for the road surface.
    pub fn texture_tiling(&self) -> f32 {
        self.max_points as f32 * self.step_tiling
    }
}

/// Built-in segment mix: mostly gentle curves, some straights, occasional
/// hairpins and hills.
pub fn default_profiles() -> Vec<WeightedProfile> {
    vec![
        WeightedProfile::new(
            SegmentProfile {
                name: "straight".into(),
                length: ValueRange::new(15.0, 60.0),
                height_offset: ValueRange::new(0.0, 2.0),
                ..Default::default()
            },
            3,
        ),
        WeightedProfile::new(
            SegmentProfile {
                name: "gentle_curve".into(),
                length: ValueRange::new(20.0, 80.0),
                direction_offset: ValueRange::new(10.0, 45.0),
                height_offset: ValueRange::new(0.0, 4.0),
                ..Default::default()
            },
            5,
        ),
        WeightedProfile::new(
            SegmentProfile {
                name: "hairpin".into(),
                length: ValueRange::new(10.0, 25.0),
                length_curve: Curve::EaseInOut,
                direction_offset: ValueRange::new(90.0, 170.0),
                ..Default::default()
            },
            1,
        ),
        WeightedProfile::new(
            SegmentProfile {
                name: "hill".into(),
                length: ValueRange::new(30.0, 90.0),
                direction_offset: ValueRange::new(0.0, 15.0),
                height_offset: ValueRange::new(4.0, 12.0),
                // skew toward the low end of the range
                height_offset_curve: Curve::sampled(vec![(0.0, 0.0), (0.7, 0.3), (1.0, 1.0)]),
                ..Default::default()
            },
            2,
        ),
    ]
}
