//! Convergence and tilt properties of the motion tracker over long,
//! irregular pointer streams.

use companion_core::motion::{MotionTracker, PointerSample, SpringConfig, TiltRule};
use companion_core::utils::config::MotionConfig;

const FRAME: f32 = 1.0 / 60.0;

/// Deterministic wandering pointer path with jumps and jitter.
fn pointer_path(seed: u64, len: usize) -> Vec<PointerSample> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let (mut x, mut y) = (640.0_f32, 360.0_f32);
    (0..len)
        .map(|_| {
            if rng.u8(..10) == 0 {
                x = rng.f32() * 1920.0;
                y = rng.f32() * 1080.0;
            } else {
                x = (x + (rng.f32() - 0.5) * 30.0).clamp(0.0, 1920.0);
                y = (y + (rng.f32() - 0.5) * 30.0).clamp(0.0, 1080.0);
            }
            PointerSample::new(x, y)
        })
        .collect()
}

#[test]
fn test_settles_on_final_target_for_many_paths() {
    for seed in 0..20 {
        let mut tracker = MotionTracker::default();
        let path = pointer_path(seed, 200);
        for sample in &path {
            tracker.on_pointer(*sample);
            tracker.advance(FRAME);
        }

        let last = *path.last().unwrap();
        // One second of stillness is plenty for the default spring.
        for _ in 0..60 {
            tracker.advance(FRAME);
        }
        let position = tracker.position();
        assert!(
            (position.x - last.x).abs() < 0.5 && (position.y - last.y).abs() < 0.5,
            "seed {}: {:?} vs {:?}",
            seed,
            position,
            last
        );
        assert!(tracker.is_at_rest(), "seed {}: still moving", seed);
    }
}

#[test]
fn test_tilt_stays_bounded_and_changes_only_on_real_moves() {
    let rule = TiltRule::default();
    for seed in 0..20 {
        let mut tracker = MotionTracker::default();
        let mut previous: Option<PointerSample> = None;
        for sample in pointer_path(seed, 300) {
            let before = tracker.tilt();
            tracker.on_pointer(sample);
            let after = tracker.tilt();

            assert!((-rule.limit..=rule.limit).contains(&after));
            if let Some(prev) = previous {
                let moved = (sample.x - prev.x).abs() > rule.threshold
                    || (sample.y - prev.y).abs() > rule.threshold;
                if !moved {
                    assert_eq!(before, after, "tilt changed on a sub-threshold move");
                }
            }
            previous = Some(sample);
        }
    }
}

#[test]
fn test_settle_time_is_bounded_for_large_jumps() {
    let mut tracker = MotionTracker::default().starting_at(0.0, 0.0);
    tracker.on_pointer(PointerSample::new(1920.0, 1080.0));

    let mut elapsed = 0.0;
    while tracker.advance(FRAME) {
        elapsed += FRAME;
        assert!(elapsed < 1.5, "did not settle within 1.5s");
    }
}

#[test]
fn test_underdamped_config_still_settles() {
    let motion = MotionConfig {
        damping: 8.0,
        ..MotionConfig::default()
    };
    assert!(motion.spring().damping_ratio() < 1.0);

    let mut tracker = MotionTracker::new(motion.spring(), motion.tilt_rule());
    tracker.on_pointer(PointerSample::new(500.0, 500.0));
    for _ in 0..(60 * 3) {
        tracker.advance(FRAME);
    }
    assert!(tracker.is_at_rest());
    assert_eq!(tracker.position().x, 500.0);
}

#[test]
fn test_default_spring_matches_motion_defaults() {
    assert_eq!(MotionConfig::default().spring(), SpringConfig::default());
}
