use hound::WavReader;
use log::debug;
use smallvec::{smallvec as svec, SmallVec};
use std::path::Path;
use std::time::Duration;

pub type AudioData = SmallVec<[Vec<f32>; 2]>;

#[derive(Debug, Clone)]
pub struct Recording {
    pub sample_rate: u32,
    pub channels: AudioData,
}

impl Recording {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Averages all channels into a single signal.
    pub fn mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => (0..self.frames())
                .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / n as f32)
                .collect(),
        }
    }
}

pub fn read_wav_file<P: AsRef<Path>>(path: P) -> Result<Recording, hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    debug!("wav spec: {:?}", spec);
    let num_channels = spec.channels.max(1) as usize;
    let mut data: AudioData = svec![];
    for _ in 0..num_channels {
        data.push(Vec::with_capacity(reader.duration() as usize));
    }

    let mut push = |sample_count: usize, sample: f32| {
        data[sample_count % num_channels].push(sample);
    };

    match spec.sample_format {
        hound::SampleFormat::Int => {
            // hound sign-extends every int sample into i32
            let full_scale = match spec.bits_per_sample {
                8 | 16 | 24 | 32 => (1u64 << (spec.bits_per_sample - 1)) as f32,
                _ => return Err(hound::Error::Unsupported),
            };
            for (i, result) in reader.samples::<i32>().enumerate() {
                push(i, result? as f32 / full_scale);
            }
        }
        hound::SampleFormat::Float => {
            for (i, result) in reader.samples::<f32>().enumerate() {
                push(i, result?);
            }
        }
    }

    Ok(Recording {
        sample_rate: spec.sample_rate,
        channels: data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_averages_channels() {
        let rec = Recording {
            sample_rate: 4,
            channels: svec![vec![1.0, 0.0, -1.0, 0.5], vec![0.0, 0.0, 1.0, 0.5]],
        };
        assert_eq!(rec.mono(), vec![0.5, 0.0, 0.0, 0.5]);
        assert_eq!(rec.duration(), Duration::from_secs(1));
    }

    #[test]
    fn empty_recording() {
        let rec = Recording {
            sample_rate: 0,
            channels: svec![],
        };
        assert!(rec.mono().is_empty());
        assert_eq!(rec.duration(), Duration::ZERO);
    }
}
