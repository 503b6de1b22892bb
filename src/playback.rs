use anyhow::{anyhow, bail, Context};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, SizedSample,
};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

use crate::config::UPDATE_INTERVAL;
use crate::rpm::RpmProvider;
use crate::wav::{AudioData, Recording};

/// Loops a recording at a variable rate, reading between samples with linear
/// interpolation.
#[derive(Debug, Clone)]
pub struct Resampler {
    data: AudioData,
    /// source frames per device frame at ratio 1
    rate_step: f64,
    ratio: f64,
    position: f64,
}

impl Resampler {
    pub fn new(data: AudioData, source_rate: u32, device_rate: u32) -> Self {
        Self {
            data,
            rate_step: source_rate as f64 / device_rate as f64,
            ratio: 1.0,
            position: 0.0,
        }
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.max(0.0);
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Fills one output frame. Output channels beyond the source's wrap around
    /// onto the source channels.
    pub fn next_frame(&mut self, frame: &mut [f32]) {
        let len = self.len();
        if len == 0 {
            frame.fill(0.0);
            return;
        }
        let index = self.position as usize % len;
        let next = (index + 1) % len;
        let frac = self.position.fract() as f32;
        for (c, out) in frame.iter_mut().enumerate() {
            let channel = &self.data[c % self.data.len()];
            *out = channel[index] + (channel[next] - channel[index]) * frac;
        }
        self.position = (self.position + self.ratio * self.rate_step) % len as f64;
    }
}

/// What the audio callback reads and the control loop retargets.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    resampler: Resampler,
    gain: f32,
}

impl PlaybackState {
    pub fn new(resampler: Resampler) -> Self {
        Self {
            resampler,
            gain: 0.0,
        }
    }

    /// Re-pitches towards `rpm` and returns the playback ratio.
    pub fn retarget(&mut self, rpm: i32, recorded_rpm: f32) -> f64 {
        let ratio = rpm as f64 / recorded_rpm as f64;
        self.resampler.set_ratio(ratio);
        self.gain = (ratio - 1.0) as f32;
        ratio
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Fills interleaved `output` with amplified frames.
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        let amplitude = 1.0 + self.gain;
        for frame in output.chunks_mut(channels.max(1)) {
            self.resampler.next_frame(frame);
            for sample in frame.iter_mut() {
                *sample *= amplitude;
            }
        }
    }
}

/// Plays `recording` looped on the default output device, re-pitched so that an
/// engine recorded at `recorded_rpm` sounds like it runs at each RPM the profile
/// yields. Returns once the profile is done.
pub fn play_at<P: RpmProvider>(
    recording: &Recording,
    recorded_rpm: f32,
    mut profile: P,
) -> anyhow::Result<()> {
    if recorded_rpm <= 0.0 {
        bail!("recorded rpm must be positive, got {}", recorded_rpm);
    }
    if recording.frames() == 0 {
        bail!("recording is empty");
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no default output device"))?;
    let config = device
        .default_output_config()
        .context("failed to get default output config")?;
    info!(
        "output: {} @ {} Hz",
        device.name().unwrap_or_default(),
        config.sample_rate().0
    );

    let state = Arc::new(Mutex::new(PlaybackState::new(Resampler::new(
        recording.channels.clone(),
        recording.sample_rate,
        config.sample_rate().0,
    ))));

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), state.clone()),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), state.clone()),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), state.clone()),
        format => bail!("unsupported sample format {:?}", format),
    }?;

    let mut playing = false;
    while !profile.done() {
        let rpm = profile.step();
        debug!("playing at {}", rpm);
        state
            .lock()
            .map_err(|_| anyhow!("playback state poisoned"))?
            .retarget(rpm, recorded_rpm);
        if !playing {
            stream.play()?;
            playing = true;
        }
        std::thread::sleep(UPDATE_INTERVAL);
    }
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    state: Arc<Mutex<PlaybackState>>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!("an error occurred on stream: {}", err);
    let mut buffer: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut state) = state.lock() else {
                output.fill(T::EQUILIBRIUM);
                return;
            };
            buffer.resize(output.len(), 0.0);
            state.render(&mut buffer, channels);
            for (sample, value) in output.iter_mut().zip(&buffer) {
                *sample = T::from_sample(*value);
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}
