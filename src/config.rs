use std::time::Duration;

pub const RECORDING_PATH: &str = "data/cheetah/ENGINE_IDLE.wav";

/// Number of FFT bins shown in the low band plot.
pub const LOW_BAND_BINS: usize = 150;
/// Hz to revolutions per minute.
pub const RPM_SCALE: f32 = 60.0;
pub const MAX_RPM: f32 = 8000.0;

pub const UPDATE_INTERVAL: Duration = Duration::from_millis(5);
pub const SMOOTHING_ALPHA: f64 = 0.01;

pub const IDLE_RPM: i32 = 1300;
pub const REDLINE_RPM: i32 = 6500;
pub const RAMP_STEPS: i32 = 1000;
pub const HOLD_STEPS: i32 = 500;
