pub mod config;
pub mod playback;
pub mod plot;
pub mod rpm;
pub mod spectrum;
pub mod wav;

pub use playback::play_at;
pub use plot::plot_band;
pub use rpm::{engine_ramp, Interpolate, Jitter, RpmProvider, Sequence, Smoothed};
pub use spectrum::{
    averaged_spectrum, dominant_rpm, fft_frequencies, low_band, magnitude_spectrum,
    AveragedSpectrum, RpmEstimate,
};
pub use wav::{read_wav_file, AudioData, Recording};
