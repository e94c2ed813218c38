//! Roadgen - endless procedural road paths and road meshes

pub mod core;
pub mod math;
pub mod road;
pub mod path;
pub mod mesh;
