use anyhow::{bail, Result};
use log::{debug, info};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::FftPlanner;

/// Magnitude of every FFT output index of a real signal.
pub fn magnitude_spectrum(signal: &[f32]) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }
    let fft = FftPlanner::<f32>::new().plan_fft_forward(signal.len());
    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|s| Complex::new(*s, 0.0)).collect();
    fft.process(&mut buffer);
    buffer.iter().map(|c| c.norm()).collect()
}

/// Frequency in Hz of each of the `n` FFT output indices. The upper half maps
/// to negative frequencies.
pub fn fft_frequencies(n: usize, sample_rate: u32) -> Vec<f32> {
    let spacing = sample_rate as f32 / n as f32;
    let positive = (n + 1) / 2;
    (0..n)
        .map(|k| {
            if k < positive {
                k as f32 * spacing
            } else {
                (k as f32 - n as f32) * spacing
            }
        })
        .collect()
}

/// First `bins` points as `[frequency * scale, magnitude]`.
pub fn low_band(
    magnitudes: &[f32],
    frequencies: &[f32],
    bins: usize,
    scale: f32,
) -> Vec<[f64; 2]> {
    frequencies
        .iter()
        .zip(magnitudes)
        .take(bins)
        .map(|(f, m)| [(f * scale) as f64, *m as f64])
        .collect()
}

#[derive(Debug, Clone)]
pub struct AveragedSpectrum {
    pub bins: Vec<Complex<f32>>,
    pub bin_width: f32,
}

/// Sums the spectra of consecutive one-second windows (or one window covering
/// the whole signal when it is shorter). Only the lower half is kept.
pub fn averaged_spectrum(signal: &[f32], sample_rate: u32) -> Result<AveragedSpectrum> {
    let window_size = signal.len().min(sample_rate as usize);
    if window_size == 0 {
        bail!("cannot analyse an empty signal");
    }

    let fft = FftPlanner::<f32>::new().plan_fft_forward(window_size);
    let mut analysis = vec![Complex::<f32>::zero(); window_size];
    let mut input = vec![Complex::<f32>::zero(); window_size];
    let mut windows = 0;
    for window in signal.chunks_exact(window_size) {
        for (sample, input) in window.iter().zip(input.iter_mut()) {
            *input = Complex::new(*sample, 0.0);
        }
        fft.process(&mut input);
        for (acc, x) in analysis.iter_mut().zip(&input) {
            *acc += *x;
        }
        windows += 1;
    }
    debug!("summed {} windows of {} samples", windows, window_size);

    analysis.truncate(window_size / 2);
    Ok(AveragedSpectrum {
        bins: analysis,
        bin_width: sample_rate as f32 / window_size as f32,
    })
}

#[derive(Debug, Clone, Default)]
pub struct RpmEstimate {
    pub rpm: f32,
    pub magnitude: f32,
    pub points: Vec<[f64; 2]>,
}

/// Finds the strongest bin between DC and `max_rpm`, with bin frequencies
/// multiplied by `scale` (60 for Hz to RPM).
pub fn dominant_rpm(spectrum: &AveragedSpectrum, max_rpm: f32, scale: f32) -> RpmEstimate {
    let mut estimate = RpmEstimate::default();
    for (i, bin) in spectrum.bins.iter().enumerate().skip(1) {
        let rpm = spectrum.bin_width * i as f32 * scale;
        if rpm > max_rpm {
            break;
        }
        let magnitude = bin.norm();
        estimate.points.push([rpm as f64, magnitude as f64]);
        if magnitude > estimate.magnitude {
            estimate.magnitude = magnitude;
            estimate.rpm = rpm;
        }
    }
    info!("dominant rpm {:.1} (magnitude {:.3})", estimate.rpm, estimate.magnitude);
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn frequencies_match_fftfreq() {
        assert_eq!(fft_frequencies(4, 8), vec![0.0, 2.0, -4.0, -2.0]);
        assert_eq!(fft_frequencies(5, 10), vec![0.0, 2.0, 4.0, -4.0, -2.0]);
        assert!(fft_frequencies(0, 44100).is_empty());
    }

    #[test]
    fn dc_signal_lands_in_first_bin() {
        let spectrum = magnitude_spectrum(&[1.0; 100]);
        assert_eq!(spectrum.len(), 100);
        assert!((spectrum[0] - 100.0).abs() < 1e-3);
        assert!(spectrum[10] < 1e-3);
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let sample_rate = 1000;
        let signal = sine(50.0, sample_rate, 1000);
        let spectrum = magnitude_spectrum(&signal);
        let (peak, _) = spectrum[..500]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(peak, 50);
        assert!((spectrum[50] - 500.0).abs() < 1.0);
    }

    #[test]
    fn low_band_scales_and_clamps() {
        let mags = [3.0, 2.0, 1.0];
        let freqs = fft_frequencies(3, 3);
        let band = low_band(&mags, &freqs, 2, 60.0);
        assert_eq!(band, vec![[0.0, 3.0], [60.0, 2.0]]);
        assert_eq!(low_band(&mags, &freqs, 150, 60.0).len(), 3);
    }

    #[test]
    fn averaged_spectrum_drops_partial_window() {
        let signal = sine(20.0, 100, 250);
        let spectrum = averaged_spectrum(&signal, 100).unwrap();
        assert_eq!(spectrum.bins.len(), 50);
        assert_eq!(spectrum.bin_width, 1.0);
        // two full windows, each peaking at ~50
        assert!((spectrum.bins[20].norm() - 100.0).abs() < 0.5);
    }

    #[test]
    fn short_signal_uses_one_window() {
        let signal = sine(10.0, 1000, 200);
        let spectrum = averaged_spectrum(&signal, 1000).unwrap();
        assert_eq!(spectrum.bins.len(), 100);
        assert_eq!(spectrum.bin_width, 5.0);
    }

    #[test]
    fn empty_signal_is_an_error() {
        assert!(averaged_spectrum(&[], 44100).is_err());
    }

    #[test]
    fn dominant_rpm_skips_dc_and_stops_at_ceiling() {
        // 25 Hz = 1500 rpm, 150 Hz = 9000 rpm
        let mut signal: Vec<f32> = sine(25.0, 1000, 1000);
        for (s, hi) in signal.iter_mut().zip(sine(150.0, 1000, 1000)) {
            *s += 1.0 + 3.0 * hi;
        }
        let spectrum = averaged_spectrum(&signal, 1000).unwrap();
        let estimate = dominant_rpm(&spectrum, 8000.0, 60.0);
        assert_eq!(estimate.rpm, 1500.0);
        assert_eq!(estimate.points.len(), 133);
        assert_eq!(estimate.points[0][0], 60.0);
    }

    #[test]
    fn dominant_rpm_honours_scale() {
        let signal = sine(25.0, 1000, 1000);
        let spectrum = averaged_spectrum(&signal, 1000).unwrap();

        let hz = dominant_rpm(&spectrum, 100.0, 1.0);
        assert_eq!(hz.rpm, 25.0);
        assert_eq!(hz.points.len(), 100);

        // ceiling applies after scaling: 25 Hz * 60 = 1500 > 1000
        let capped = dominant_rpm(&spectrum, 1000.0, 60.0);
        assert_eq!(capped.points.len(), 16);
        assert_ne!(capped.rpm, 1500.0);
    }

    #[test]
    fn silence_has_no_dominant_rpm() {
        let spectrum = averaged_spectrum(&[0.0; 64], 64).unwrap();
        let estimate = dominant_rpm(&spectrum, 8000.0, 60.0);
        assert_eq!(estimate.rpm, 0.0);
        assert_eq!(estimate.points.len(), 31);
    }
}
