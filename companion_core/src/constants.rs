// Frame pacing for front-ends driving the motion tracker
pub const FRAME_INTERVAL_MS: u64 = 16;

// Spring physics defaults (per axis)
pub const SPRING_STIFFNESS: f32 = 200.0;
pub const SPRING_DAMPING: f32 = 25.0;
pub const SPRING_MASS: f32 = 0.5;
pub const SPRING_REST_DELTA: f32 = 0.5;
pub const SPRING_REST_SPEED: f32 = 2.0;
/// Largest integration step in seconds; longer frames are split.
pub const SPRING_MAX_SUBSTEP: f32 = 1.0 / 120.0;

// Tilt
pub const TILT_GAIN: f32 = 2.0;
pub const TILT_LIMIT_DEG: f32 = 25.0;
pub const TILT_THRESHOLD: f32 = 1.0;

// Remark scheduling
pub const REMARK_TICK_INTERVAL_SECS: u64 = 10;
pub const REMARK_TICK_CHANCE: f64 = 0.3;
pub const REMARK_DISPLAY_SECS: u64 = 4;
/// Upper bound for the tick interval and the display window.
pub const REMARK_MAX_INTERVAL_SECS: u64 = 86_400;

// Remark generation
pub const REMARK_WORD_LIMIT: usize = 15;
pub const GENERATOR_TIMEOUT_SECS: u64 = 15;
pub const GENERATOR_TEMPERATURE: f32 = 0.9;
pub const GENERATOR_MAX_OUTPUT_TOKENS: u32 = 30;
pub const GENERATOR_MAX_TIMEOUT_SECS: u64 = 600;
