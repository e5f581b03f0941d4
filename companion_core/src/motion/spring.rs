use crate::constants::{
    SPRING_DAMPING, SPRING_MASS, SPRING_MAX_SUBSTEP, SPRING_REST_DELTA, SPRING_REST_SPEED,
    SPRING_STIFFNESS,
};

/// Physical parameters of a damped spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Distance below which the spring may come to rest.
    pub rest_delta: f32,
    /// Speed (units per second) below which the spring may come to rest.
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            mass: SPRING_MASS,
            rest_delta: SPRING_REST_DELTA,
            rest_speed: SPRING_REST_SPEED,
        }
    }
}

impl SpringConfig {
    /// Damping ratio; values >= 1.0 never overshoot in continuous time.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// A spring-based animation value for smooth transitions.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
    pub config: SpringConfig,
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl Spring {
    /// Creates a resting spring at the origin.
    pub fn new(config: SpringConfig) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            config,
        }
    }

    /// Advances the physics by `dt` seconds. Returns true if still animating.
    pub fn update(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return !self.is_at_rest();
        }

        let mut remaining = dt;
        while remaining > 0.0 {
            let step = remaining.min(SPRING_MAX_SUBSTEP);
            let spring_force = -self.config.stiffness * (self.position - self.target);
            let damping_force = -self.config.damping * self.velocity;
            let acceleration = (spring_force + damping_force) / self.config.mass;

            // Semi-implicit Euler: velocity first, then position.
            self.velocity += acceleration * step;
            self.position += self.velocity * step;
            remaining -= step;
        }

        if self.is_settling() {
            self.snap_to(self.target);
            return false;
        }
        true
    }

    /// Sets the target value for the spring to animate towards.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jumps to `value` and stops all motion.
    pub fn snap_to(&mut self, value: f32) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    fn is_settling(&self) -> bool {
        (self.target - self.position).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(spring: &mut Spring, seconds: f32) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            spring.update(FRAME);
        }
    }

    #[test]
    fn test_default_config_is_overdamped() {
        let config = SpringConfig::default();
        assert!(config.damping_ratio() > 1.0);
    }

    #[test]
    fn test_spring_settles_on_target() {
        let mut spring = Spring::default();
        spring.set_target(1000.0);
        run(&mut spring, 1.0);
        assert_eq!(spring.position, 1000.0);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn test_spring_does_not_oscillate() {
        let mut spring = Spring::default();
        spring.set_target(500.0);

        let mut sign_changes = 0;
        let mut last_sign = (spring.position - spring.target).signum();
        for _ in 0..120 {
            spring.update(FRAME);
            let offset = spring.position - spring.target;
            if offset != 0.0 && offset.signum() != last_sign {
                sign_changes += 1;
                last_sign = offset.signum();
            }
        }
        assert!(sign_changes <= 1, "spring crossed target {} times", sign_changes);
    }

    #[test]
    fn test_long_frame_is_split_into_substeps() {
        let mut spring = Spring::default();
        spring.set_target(300.0);
        // A single huge frame must not blow up the integration.
        spring.update(2.0);
        assert!(spring.position.is_finite());
        assert_eq!(spring.position, 300.0);
    }

    #[test]
    fn test_update_ignores_non_positive_dt() {
        let mut spring = Spring::default();
        spring.set_target(10.0);
        assert!(spring.update(0.0));
        assert_eq!(spring.position, 0.0);
        assert!(spring.update(f32::NAN));
        assert_eq!(spring.position, 0.0);
    }

    #[test]
    fn test_snap_to_stops_motion() {
        let mut spring = Spring::default();
        spring.set_target(50.0);
        spring.update(FRAME);
        spring.snap_to(20.0);
        assert!(spring.is_at_rest());
        assert!(!spring.update(FRAME));
    }
}
