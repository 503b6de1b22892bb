use engine_scope::config::{LOW_BAND_BINS, RECORDING_PATH, RPM_SCALE};
use engine_scope::*;

// cargo run -r --example plot-spectrum
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let recording = read_wav_file(RECORDING_PATH)?;
    let signal = recording.mono();
    let magnitudes = magnitude_spectrum(&signal);
    let frequencies = fft_frequencies(magnitudes.len(), recording.sample_rate);
    let band = low_band(&magnitudes, &frequencies, LOW_BAND_BINS, RPM_SCALE);
    plot_band(RECORDING_PATH, band).map_err(|e| anyhow::anyhow!("{}", e))
}
