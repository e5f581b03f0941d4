//! Pointer-following motion: per-axis damped springs plus a bounded tilt.

mod spring;
mod tracker;

pub use spring::{Spring, SpringConfig};
pub use tracker::{MotionTracker, PointerSample, SmoothedPosition, TiltRule};
