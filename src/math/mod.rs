//! Mathematical utilities and data structures

pub mod aabb;
pub mod curve;
pub mod interp;

pub use aabb::Aabb;
pub use curve::{Curve, KeyframeCurve};
pub use interp::{delta_angle, heading_vector, lerp, lerp_angle};
