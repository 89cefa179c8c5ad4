use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Capture/decoder sample rate in Hz. The whole pipeline assumes mono f32
/// samples at this rate.
pub const SAMPLE_RATE: u32 = 16_000;

/// Shortest stretch of audio worth sending to the decoder, in seconds.
pub const MIN_DECODE_SEC: f64 = 0.3;

/// Peak amplitude below which a leftover tail is treated as dead air.
pub const TAIL_PEAK_FLOOR: f32 = 0.001;

/// How many trailing characters of the transcript-so-far feed the rolling prompt.
pub const PROMPT_TAIL_CHARS: usize = 180;

/// Low-confidence chunk ratio at which the final pass kicks in.
pub const LOW_CONF_RATIO_TRIGGER: f64 = 0.35;

/// Temperature fallback ladder used by the whole-recording final pass.
pub const FINAL_TEMPERATURES: [f32; 4] = [0.0, 0.2, 0.4, 0.6];

/// Default hotword prompt: product names and proper nouns the decoder keeps
/// mangling without a hint.
pub const DEFAULT_HOTWORDS: &str = "Sotto, Whisper Flow, Miro, Zoom, Claude Code, ChatGPT.";

/// Raw settings as deserialized from the environment, before clamping.
#[derive(Debug, Deserialize)]
struct RawSettings {
    model: String,
    language: String,
    chunk_sec: f64,
    worker_poll_sec: f64,
    final_pass_min_sec: f64,
    final_pass_max_sec: f64,
    low_conf_logprob: f64,
    silence_skip_no_speech: f64,
    silence_skip_max_chars: u32,
    save_transcripts: bool,
    save_perf_log: bool,
    transcript_log: String,
    perf_log: String,
    hotwords: String,
}

/// Resolved pipeline configuration. All durations in seconds.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Decoder model identifier, passed through to the transcriber backend.
    pub model: String,

    /// Language code for decoding (e.g. "en", "ru").
    pub language: String,

    /// Duration of one streaming decode chunk (floor: 5 s).
    pub chunk_sec: f64,

    /// Worker poll cadence while recording (floor: 0.05 s).
    pub worker_poll_sec: f64,

    /// Recordings shorter than this skip the final pass (floor: 5 s).
    pub final_pass_min_sec: f64,

    /// Recordings longer than this skip the final pass (floor: min).
    pub final_pass_max_sec: f64,

    /// A chunk with mean avg_logprob at or below this counts as low-confidence.
    pub low_conf_logprob: f64,

    /// no_speech probability above which a short fragment is treated as a
    /// silence hallucination (clamped to [0.5, 0.99]).
    pub silence_skip_no_speech: f64,

    /// Character ceiling for the silence-hallucination gate (floor: 8).
    pub silence_skip_max_chars: usize,

    /// Append accepted transcripts to `transcript_log`.
    pub save_transcripts: bool,

    /// Append performance summaries to `perf_log`.
    pub save_perf_log: bool,

    /// Transcript log file path.
    pub transcript_log: PathBuf,

    /// Performance log file path.
    pub perf_log: PathBuf,

    /// Hotword prompt prefix fed to every decode.
    pub hotwords: String,
}

impl PipelineConfig {
    /// Load configuration from `SOTTO_*` environment variables, falling back
    /// to defaults for anything unset, then clamp to the supported ranges.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("model", "large-v3")?
            .set_default("language", "en")?
            .set_default("chunk_sec", 10.0)?
            .set_default("worker_poll_sec", 0.20)?
            .set_default("final_pass_min_sec", 15.0)?
            .set_default("final_pass_max_sec", 95.0)?
            .set_default("low_conf_logprob", -1.15)?
            .set_default("silence_skip_no_speech", 0.83)?
            .set_default("silence_skip_max_chars", 36)?
            .set_default("save_transcripts", true)?
            .set_default("save_perf_log", true)?
            .set_default("transcript_log", "sotto_transcript.log")?
            .set_default("perf_log", "sotto_perf.log")?
            .set_default("hotwords", DEFAULT_HOTWORDS)?
            .add_source(config::Environment::with_prefix("SOTTO").try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        let raw: RawSettings = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let final_pass_min_sec = raw.final_pass_min_sec.max(5.0);
        Self {
            model: raw.model,
            language: raw.language,
            chunk_sec: raw.chunk_sec.max(5.0),
            worker_poll_sec: raw.worker_poll_sec.max(0.05),
            final_pass_min_sec,
            final_pass_max_sec: raw.final_pass_max_sec.max(final_pass_min_sec),
            low_conf_logprob: raw.low_conf_logprob,
            silence_skip_no_speech: raw.silence_skip_no_speech.clamp(0.5, 0.99),
            silence_skip_max_chars: raw.silence_skip_max_chars.max(8) as usize,
            save_transcripts: raw.save_transcripts,
            save_perf_log: raw.save_perf_log,
            transcript_log: PathBuf::from(raw.transcript_log),
            perf_log: PathBuf::from(raw.perf_log),
            hotwords: raw.hotwords,
        }
    }

    /// Number of samples in one streaming decode chunk.
    pub fn chunk_samples(&self) -> usize {
        (self.chunk_sec * SAMPLE_RATE as f64) as usize
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_raw(RawSettings {
            model: "large-v3".to_string(),
            language: "en".to_string(),
            chunk_sec: 10.0,
            worker_poll_sec: 0.20,
            final_pass_min_sec: 15.0,
            final_pass_max_sec: 95.0,
            low_conf_logprob: -1.15,
            silence_skip_no_speech: 0.83,
            silence_skip_max_chars: 36,
            save_transcripts: true,
            save_perf_log: true,
            transcript_log: "sotto_transcript.log".to_string(),
            perf_log: "sotto_perf.log".to_string(),
            hotwords: DEFAULT_HOTWORDS.to_string(),
        })
    }
}
