//! Procedural road centerline generation.
//!
//! - [`profile`]: segment profiles and weighted selection
//! - [`segment`]: the live segment walked step by step
//! - [`generator`]: the segment state machine producing centerline points
//! - [`config`]: JSON-loadable configuration for a whole road
//! - [`stream`]: the driver tying generator, path window and mesh together

pub mod profile;
pub mod segment;
pub mod generator;
pub mod config;
pub mod stream;

pub use profile::{ProfileSelector, SegmentProfile, ValueRange, WeightedProfile};
pub use segment::ActiveSegment;
pub use generator::{GeneratorConfig, GeneratorState, PathSegmentGenerator};
pub use config::RoadConfig;
pub use stream::{CheckpointPose, RoadStream};
