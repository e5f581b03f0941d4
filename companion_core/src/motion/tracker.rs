use serde::{Deserialize, Serialize};

use super::spring::{Spring, SpringConfig};
use crate::constants::{TILT_GAIN, TILT_LIMIT_DEG, TILT_THRESHOLD};

/// Latest raw pointer location reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Spring-interpolated companion position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SmoothedPosition {
    pub x: f32,
    pub y: f32,
}

/// Lean applied to the companion from horizontal pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltRule {
    /// Degrees of tilt per unit of horizontal displacement.
    pub gain: f32,
    /// Symmetric bound in degrees.
    pub limit: f32,
    /// Displacement on either axis that must be exceeded to retilt.
    pub threshold: f32,
}

impl Default for TiltRule {
    fn default() -> Self {
        Self {
            gain: TILT_GAIN,
            limit: TILT_LIMIT_DEG,
            threshold: TILT_THRESHOLD,
        }
    }
}

impl TiltRule {
    /// Returns the new tilt for a displacement, or `None` when the movement
    /// is too small and the previous tilt should hold.
    pub fn tilt_for(&self, dx: f32, dy: f32) -> Option<f32> {
        if dx.abs() > self.threshold || dy.abs() > self.threshold {
            Some((dx * self.gain).clamp(-self.limit, self.limit))
        } else {
            None
        }
    }
}

/// Turns raw pointer events into a smoothed position and a bounded tilt.
///
/// Pointer events only move the spring targets; [`MotionTracker::advance`]
/// integrates the springs once per animation frame.
#[derive(Debug, Clone)]
pub struct MotionTracker {
    x: Spring,
    y: Spring,
    tilt_rule: TiltRule,
    tilt: f32,
    previous: Option<PointerSample>,
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new(SpringConfig::default(), TiltRule::default())
    }
}

impl MotionTracker {
    pub fn new(spring: SpringConfig, tilt_rule: TiltRule) -> Self {
        Self {
            x: Spring::new(spring),
            y: Spring::new(spring),
            tilt_rule,
            tilt: 0.0,
            previous: None,
        }
    }

    /// Places the companion at `(x, y)` without animating.
    pub fn starting_at(mut self, x: f32, y: f32) -> Self {
        self.x.snap_to(x);
        self.y.snap_to(y);
        self
    }

    /// Records a pointer event as the new spring target and updates the tilt.
    pub fn on_pointer(&mut self, sample: PointerSample) {
        self.x.set_target(sample.x);
        self.y.set_target(sample.y);

        // The first sample has nothing to be compared against.
        if let Some(previous) = self.previous {
            if let Some(tilt) = self
                .tilt_rule
                .tilt_for(sample.x - previous.x, sample.y - previous.y)
            {
                self.tilt = tilt;
            }
        }
        self.previous = Some(sample);
    }

    /// Advances both springs by `dt` seconds. Returns true while moving.
    pub fn advance(&mut self, dt: f32) -> bool {
        let moving_x = self.x.update(dt);
        let moving_y = self.y.update(dt);
        moving_x || moving_y
    }

    pub fn position(&self) -> SmoothedPosition {
        SmoothedPosition {
            x: self.x.position,
            y: self.y.position,
        }
    }

    /// Current tilt in degrees, always within the rule's limit.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn target(&self) -> Option<PointerSample> {
        self.previous
    }

    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_first_sample_does_not_tilt() {
        let mut tracker = MotionTracker::default();
        tracker.on_pointer(PointerSample::new(400.0, 300.0));
        assert_eq!(tracker.tilt(), 0.0);
    }

    #[test]
    fn test_tilt_follows_horizontal_motion() {
        let mut tracker = MotionTracker::default();
        tracker.on_pointer(PointerSample::new(100.0, 100.0));
        tracker.on_pointer(PointerSample::new(105.0, 100.0));
        assert_eq!(tracker.tilt(), 10.0);
        tracker.on_pointer(PointerSample::new(101.0, 100.0));
        assert_eq!(tracker.tilt(), -8.0);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let mut tracker = MotionTracker::default();
        tracker.on_pointer(PointerSample::new(0.0, 0.0));
        tracker.on_pointer(PointerSample::new(400.0, 0.0));
        assert_eq!(tracker.tilt(), 25.0);
        tracker.on_pointer(PointerSample::new(0.0, 0.0));
        assert_eq!(tracker.tilt(), -25.0);
    }

    #[test]
    fn test_small_moves_hold_tilt() {
        let mut tracker = MotionTracker::default();
        tracker.on_pointer(PointerSample::new(0.0, 0.0));
        tracker.on_pointer(PointerSample::new(6.0, 0.0));
        assert_eq!(tracker.tilt(), 12.0);
        tracker.on_pointer(PointerSample::new(6.5, 0.5));
        assert_eq!(tracker.tilt(), 12.0);
    }

    #[test]
    fn test_vertical_motion_resets_tilt_to_horizontal_component() {
        let mut tracker = MotionTracker::default();
        tracker.on_pointer(PointerSample::new(0.0, 0.0));
        tracker.on_pointer(PointerSample::new(10.0, 0.0));
        // Large vertical move with no horizontal component levels out.
        tracker.on_pointer(PointerSample::new(10.0, 40.0));
        assert_eq!(tracker.tilt(), 0.0);
    }

    #[test]
    fn test_position_converges_to_last_target() {
        let mut tracker = MotionTracker::default().starting_at(0.0, 0.0);
        for i in 0..20 {
            tracker.on_pointer(PointerSample::new(i as f32 * 37.0, 600.0 - i as f32 * 11.0));
            tracker.advance(FRAME);
        }
        let mut frames = 0;
        while tracker.advance(FRAME) {
            frames += 1;
            assert!(frames < 120, "tracker failed to settle");
        }
        let position = tracker.position();
        assert_eq!(position.x, 19.0 * 37.0);
        assert_eq!(position.y, 600.0 - 19.0 * 11.0);
    }

    #[test]
    fn test_starting_at_is_at_rest() {
        let tracker = MotionTracker::default().starting_at(12.0, 34.0);
        assert!(tracker.is_at_rest());
        assert_eq!(tracker.position(), SmoothedPosition { x: 12.0, y: 34.0 });
        assert_eq!(tracker.target(), None);
    }
}
