use anyhow::Result;
use clap::Parser;
use sotto::{PipelineConfig, WavFileSource};
use std::path::PathBuf;
use tracing::info;

/// Streaming dictation decode pipeline.
///
/// The pipeline is a library consumed by an app shell that supplies the
/// microphone and the decoder; this binary reports the resolved
/// configuration and can sanity-check recorded audio.
#[derive(Parser)]
#[command(name = "sotto", version)]
struct Cli {
    /// Inspect a 16 kHz mono WAV file and report its pipeline stats
    #[arg(long)]
    inspect: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = PipelineConfig::from_env()?;

    info!("sotto v{}", env!("CARGO_PKG_VERSION"));
    info!("Model: {} (language={})", cfg.model, cfg.language);
    info!(
        "Streaming: chunk={:.1}s, poll={:.2}s, low-conf floor={:.2}",
        cfg.chunk_sec, cfg.worker_poll_sec, cfg.low_conf_logprob
    );
    info!(
        "Final pass: {:.0}-{:.0}s; silence gate: p>={:.2}, <={} chars",
        cfg.final_pass_min_sec,
        cfg.final_pass_max_sec,
        cfg.silence_skip_no_speech,
        cfg.silence_skip_max_chars
    );
    info!(
        "Persistence: transcripts={} ({:?}), perf={} ({:?})",
        if cfg.save_transcripts { "on" } else { "off" },
        cfg.transcript_log,
        if cfg.save_perf_log { "on" } else { "off" },
        cfg.perf_log
    );

    if let Some(path) = cli.inspect {
        let samples = WavFileSource::read_samples(&path)?;
        let secs = samples.len() as f64 / sotto::config::SAMPLE_RATE as f64;
        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        let chunks = samples.len() / cfg.chunk_samples();
        info!(
            "{:?}: {:.1}s, peak amplitude {:.4}, {} full chunk(s) + tail",
            path, secs, peak, chunks
        );
        if secs > cfg.final_pass_max_sec {
            info!("Recording exceeds the final-pass ceiling; a full re-decode would be skipped");
        }
    }

    Ok(())
}
