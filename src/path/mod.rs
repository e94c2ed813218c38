//! Centerline storage and path math

pub mod window;

pub use window::{NormalMode, SlidingWindowPath};
