//! Engine speed profiles used to drive playback.
//!
//! A profile yields one RPM value per update tick until it reports `done`.
//! Profiles compose: `Sequence` chains them, `Smoothed` and `Jitter` wrap one.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, NormalError};

use crate::config::{HOLD_STEPS, IDLE_RPM, RAMP_STEPS, REDLINE_RPM, SMOOTHING_ALPHA};

pub trait RpmProvider {
    fn step(&mut self) -> i32;
    fn done(&self) -> bool;
}

impl<P: RpmProvider + ?Sized> RpmProvider for Box<P> {
    fn step(&mut self) -> i32 {
        (**self).step()
    }

    fn done(&self) -> bool {
        (**self).done()
    }
}

/// Linear ramp from `start` towards `end` in `steps` increments.
#[derive(Debug, Clone)]
pub struct Interpolate {
    pub start: i32,
    pub end: i32,
    pub steps: i32,
    current: i32,
}

impl Interpolate {
    pub fn new(start: i32, end: i32, steps: i32) -> Self {
        Self {
            start,
            end,
            steps,
            current: 0,
        }
    }

    pub fn hold(rpm: i32, steps: i32) -> Self {
        Self::new(rpm, rpm, steps)
    }
}

impl RpmProvider for Interpolate {
    fn step(&mut self) -> i32 {
        let step_size = if self.steps == 0 {
            0
        } else {
            (self.end - self.start) / self.steps
        };
        let rpm = self.start + step_size * self.current;
        self.current += 1;
        rpm
    }

    fn done(&self) -> bool {
        self.current >= self.steps
    }
}

pub struct Sequence {
    providers: Vec<Box<dyn RpmProvider>>,
    current: usize,
    last: i32,
}

impl Sequence {
    pub fn new(providers: Vec<Box<dyn RpmProvider>>) -> Self {
        Self {
            providers,
            current: 0,
            last: 0,
        }
    }
}

impl RpmProvider for Sequence {
    fn step(&mut self) -> i32 {
        let Some(provider) = self.providers.get_mut(self.current) else {
            return self.last;
        };
        self.last = provider.step();
        if provider.done() {
            self.current += 1;
        }
        self.last
    }

    fn done(&self) -> bool {
        self.current >= self.providers.len()
    }
}

/// Exponential moving average over another provider, starting from zero.
pub struct Smoothed<P> {
    inner: P,
    alpha: f64,
    last: f64,
}

impl<P: RpmProvider> Smoothed<P> {
    pub fn new(inner: P, alpha: f64) -> Self {
        Self {
            inner,
            alpha,
            last: 0.0,
        }
    }
}

impl<P: RpmProvider> RpmProvider for Smoothed<P> {
    fn step(&mut self) -> i32 {
        let rpm = self.inner.step() as f64;
        self.last = rpm * self.alpha + (1.0 - self.alpha) * self.last;
        self.last as i32
    }

    fn done(&self) -> bool {
        self.inner.done()
    }
}

/// Adds gaussian noise to another provider.
pub struct Jitter<P> {
    inner: P,
    noise: Normal<f64>,
    rng: StdRng,
}

impl<P: RpmProvider> Jitter<P> {
    pub fn new(inner: P, std_dev: f64) -> Result<Self, NormalError> {
        Self::with_rng(inner, std_dev, StdRng::from_entropy())
    }

    pub fn seeded(inner: P, std_dev: f64, seed: u64) -> Result<Self, NormalError> {
        Self::with_rng(inner, std_dev, StdRng::seed_from_u64(seed))
    }

    fn with_rng(inner: P, std_dev: f64, rng: StdRng) -> Result<Self, NormalError> {
        // rand_distr only rejects non-finite deviations
        if std_dev < 0.0 {
            return Err(NormalError::BadVariance);
        }
        Ok(Self {
            inner,
            noise: Normal::new(0.0, std_dev)?,
            rng,
        })
    }
}

impl<P: RpmProvider> RpmProvider for Jitter<P> {
    fn step(&mut self) -> i32 {
        let rpm = self.inner.step();
        rpm + self.noise.sample(&mut self.rng) as i32
    }

    fn done(&self) -> bool {
        self.inner.done()
    }
}

/// Idle up to redline, hold, back down to idle, hold.
pub fn engine_ramp() -> Smoothed<Sequence> {
    Smoothed::new(
        Sequence::new(vec![
            Box::new(Interpolate::new(IDLE_RPM, REDLINE_RPM, RAMP_STEPS)),
            Box::new(Interpolate::hold(REDLINE_RPM, HOLD_STEPS)),
            Box::new(Interpolate::new(REDLINE_RPM, IDLE_RPM, RAMP_STEPS)),
            Box::new(Interpolate::hold(IDLE_RPM, HOLD_STEPS)),
        ]),
        SMOOTHING_ALPHA,
    )
}
