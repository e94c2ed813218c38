//! Endless road driver: generator -> sliding window -> mesh.
//!
//! [`RoadStream`] owns one generation pipeline. It keeps the window full,
//! extends the road as an observer moves along it, and always holds a mesh
//! matching the current window. Rendering and physics consume
//! [`RoadStream::mesh`] and own whatever GPU or collider resources they build
//! from it.

use rand_chacha::ChaCha8Rng;

use crate::core::{RandomSource, Result, RngSource, Vec3};
use crate::mesh::{RoadMesh, RoadMeshBuilder};
use crate::path::SlidingWindowPath;

use super::config::RoadConfig;
use super::generator::PathSegmentGenerator;

/// Height above the road surface for respawning.
const RESPAWN_LIFT: f32 = 1.0;

/// Where and facing which way to put an observer back on the road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Generation pipeline for one road.
pub struct RoadStream<R: RandomSource> {
    config: RoadConfig,
    generator: PathSegmentGenerator<R>,
    path: SlidingWindowPath,
    builder: RoadMeshBuilder,
    mesh: RoadMesh,
    checkpoint_distance: f32,
    points_generated: u64,
}

impl RoadStream<RngSource<ChaCha8Rng>> {
    /// Stream using the config's seed, or entropy when unset.
    pub fn from_config(config: RoadConfig) -> Result<Self> {
        let rng = RngSource::from_optional_seed(config.seed);
        Self::new(config, rng)
    }
}

impl<R: RandomSource> RoadStream<R> {
    /// Start a road at the configured position and fill the window.
    pub fn new(config: RoadConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let mut generator = PathSegmentGenerator::new(config.generator.clone(), rng)?;
        generator.initialize(config.start_position, config.start_direction)?;

        let mut path = SlidingWindowPath::new(config.max_points)?
            .with_normal_mode(config.normal_mode);
        path.set_closed(config.closed_path);
        path.push(config.start_position);
        for _ in 1..config.max_points {
            path.push(generator.step()?);
        }
        path.rebuild();

        let builder = RoadMeshBuilder::new(config.mesh.clone())
            .with_texture_tiling(config.texture_tiling());
        let mesh = builder.build(&path)?;
        let checkpoint_distance = path.total_length()? / 2.0;

        log::info!(
            "road stream started: {} points, length {:.1}, seed {:?}",
            path.len(),
            path.total_length()?,
            config.seed
        );

        Ok(Self {
            points_generated: config.max_points as u64 - 1,
            config,
            generator,
            path,
            builder,
            mesh,
            checkpoint_distance,
        })
    }

    pub fn config(&self) -> &RoadConfig {
        &self.config
    }

    pub fn path(&self) -> &SlidingWindowPath {
        &self.path
    }

    /// Mesh for the current window.
    pub fn mesh(&self) -> &RoadMesh {
        &self.mesh
    }

    pub fn generator(&self) -> &PathSegmentGenerator<R> {
        &self.generator
    }

    /// Points produced by the generator since start-up.
    pub fn points_generated(&self) -> u64 {
        self.points_generated
    }

    pub fn checkpoint_distance(&self) -> f32 {
        self.checkpoint_distance
    }

    /// Extend the road by one point and rebuild the mesh.
    pub fn generate_point(&mut self) -> Result<Vec3> {
        let point = self.push_next()?;
        self.refresh()?;
        Ok(point)
    }

    /// Extend the road by `count` points with a single rebuild.
    pub fn generate_points(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        for _ in 0..count {
            self.push_next()?;
        }
        self.refresh()
    }

    /// Feed the observer's position. Once the observer is more than one
    /// step past the middle of the window, one point is generated and the
    /// observer's distance becomes the new checkpoint. Returns whether the
    /// road was extended.
    pub fn update_observer(&mut self, position: Vec3) -> Result<bool> {
        let distance = self.path.closest_distance_along_path(position)?;
        let target = self.path.total_length()? / 2.0;
        if distance - target > self.generator.step_size() {
            self.generate_point()?;
            self.checkpoint_distance = distance;
            log::debug!("checkpoint at {:.1}", distance);
            return Ok(true);
        }
        Ok(false)
    }

    /// Respawn pose at the last checkpoint, lifted above the road.
    pub fn checkpoint_pose(&self) -> Result<CheckpointPose> {
        let length = self.path.total_length()?;
        let t = if length > 0.0 { self.checkpoint_distance / length } else { 0.0 };
        Ok(CheckpointPose {
            position: self.path.point_at_time(t)? + Vec3::Y * RESPAWN_LIFT,
            forward: self.path.direction_at_time(t)?,
        })
    }

    fn push_next(&mut self) -> Result<Vec3> {
        let point = self.generator.step()?;
        self.path.push(point);
        self.points_generated += 1;
        Ok(point)
    }

    fn refresh(&mut self) -> Result<()> {
        self.path.rebuild();
        self.mesh = self.builder.build(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SubmeshKind;
    use crate::road::generator::GeneratorConfig;
    use crate::road::profile::{SegmentProfile, WeightedProfile};
    use crate::math::Curve;
    use crate::path::NormalMode;

    fn straight_config(max_points: usize) -> RoadConfig {
        RoadConfig {
            seed: Some(1),
            max_points,
            generator: GeneratorConfig {
                profiles: vec![WeightedProfile::new(SegmentProfile::straight("straight", 5.0), 1)],
                step_size: 1.0,
                height_change_curve: Curve::Linear,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_startup_fills_window() {
        let stream = RoadStream::from_config(straight_config(8)).unwrap();
        assert_eq!(stream.path().len(), 8);
        assert_eq!(stream.path().point(0).unwrap(), Vec3::ZERO);
        assert_eq!(stream.points_generated(), 7);
        assert_eq!(stream.mesh().vertex_count(), 8 * 8 + 8);
        assert!((stream.path().total_length().unwrap() - 7.0).abs() < 1e-4);
        assert!((stream.checkpoint_distance() - 3.5).abs() < 1e-4);
        assert_eq!(stream.mesh().texture_tiling, 80.0);
    }

    #[test]
    fn test_generate_point_slides_window() {
        let mut stream = RoadStream::from_config(straight_config(4)).unwrap();
        let p = stream.generate_point().unwrap();
        assert!((p - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-4);
        assert_eq!(stream.path().len(), 4);
        assert!((stream.path().point(0).unwrap() - Vec3::Z).length() < 1e-4);
        assert!(!stream.path().is_stale());
        // Mesh tracks the new window
        assert!((stream.mesh().bounds.max.z - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_generate_points_batches() {
        let mut stream = RoadStream::from_config(straight_config(4)).unwrap();
        stream.generate_points(10).unwrap();
        assert_eq!(stream.points_generated(), 13);
        assert!((stream.path().point(3).unwrap().z - 13.0).abs() < 1e-3);
        assert_eq!(stream.mesh().triangle_count(SubmeshKind::Top), 6);
    }

    #[test]
    fn test_observer_triggers_generation_past_midpoint() {
        let mut stream = RoadStream::from_config(straight_config(9)).unwrap();
        // Window spans z = 0..8, midpoint 4, step 1
        assert!(!stream.update_observer(Vec3::new(0.0, 1.0, 4.5)).unwrap());
        assert_eq!(stream.points_generated(), 8);

        assert!(stream.update_observer(Vec3::new(0.0, 1.0, 5.5)).unwrap());
        assert_eq!(stream.points_generated(), 9);
        assert!((stream.checkpoint_distance() - 5.5).abs() < 1e-4);
    }

    #[test]
    fn test_checkpoint_pose() {
        let stream = RoadStream::from_config(straight_config(9)).unwrap();
        let pose = stream.checkpoint_pose().unwrap();
        assert!((pose.position - Vec3::new(0.0, 1.0, 4.0)).length() < 1e-4);
        assert!((pose.forward - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_seeded_streams_match() {
        let config = RoadConfig { seed: Some(1234), ..Default::default() };
        let mut a = RoadStream::from_config(config.clone()).unwrap();
        let mut b = RoadStream::from_config(config).unwrap();
        a.generate_points(50).unwrap();
        b.generate_points(50).unwrap();
        assert_eq!(a.mesh(), b.mesh());
    }

    #[test]
    fn test_closed_path_config_wraps_mesh() {
        let config = RoadConfig { closed_path: true, ..straight_config(4) };
        let stream = RoadStream::from_config(config).unwrap();
        assert!(stream.path().is_closed());
        assert!(!stream.mesh().has_caps());
        assert_eq!(stream.mesh().vertex_count(), 4 * 8);
        assert_eq!(stream.mesh().triangle_count(SubmeshKind::Top), 8);
    }

    #[test]
    fn test_normal_mode_reaches_path() {
        let tilted = Vec3::new(0.0, 1.0, 0.0);
        let config = RoadConfig { normal_mode: NormalMode::Up(tilted), ..straight_config(4) };
        let stream = RoadStream::from_config(config).unwrap();
        assert_eq!(stream.path().normal_mode(), NormalMode::Up(tilted));
        // Up x +Z = +X
        assert!((stream.path().normal(0).unwrap() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RoadConfig { max_points: 1, ..Default::default() };
        assert!(RoadStream::from_config(config).is_err());
    }
}
