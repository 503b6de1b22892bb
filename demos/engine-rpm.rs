use engine_scope::config::{MAX_RPM, RECORDING_PATH, RPM_SCALE};
use engine_scope::*;
use std::thread;

// cargo run -r --example engine-rpm
fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let recording = read_wav_file(RECORDING_PATH)?;
    let spectrum = averaged_spectrum(&recording.mono(), recording.sample_rate)?;
    let estimate = dominant_rpm(&spectrum, MAX_RPM, RPM_SCALE);
    log::info!("{}: max RPM {}", RECORDING_PATH, estimate.rpm);

    let recorded_rpm = estimate.rpm;
    thread::spawn(move || {
        if let Err(e) = play_at(&recording, recorded_rpm, engine_ramp()) {
            log::error!("playback failed: {:#}", e);
        }
    });
    plot_band("FFT Analysis", estimate.points).map_err(|e| anyhow::anyhow!("{}", e))
}
