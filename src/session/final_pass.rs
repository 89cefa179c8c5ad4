use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{
    PipelineConfig, FINAL_TEMPERATURES, LOW_CONF_RATIO_TRIGGER, MIN_DECODE_SEC, SAMPLE_RATE,
};
use crate::text::is_repetition_loop;
use crate::transcribe::{DecodeRequest, Temperature, Transcriber};

use super::stats::DecodeStats;

/// What the final-pass engine resolved.
#[derive(Debug, Clone)]
pub struct FinalPassOutcome {
    /// The transcript to emit: chunked, full-pass, or safe-pass text.
    pub transcript: String,

    /// Skip notice for the performance log when the recording exceeded the
    /// final-pass ceiling.
    pub skip_notice: Option<String>,
}

/// Conditional whole-recording re-decode.
///
/// Streaming chunk decodes trade accuracy for latency; when the chunked
/// transcript looks degraded (empty, loopy, or mostly low-confidence) and
/// the recording is in a length band where a full decode is worth the wait,
/// the engine re-decodes the entire recording with stronger settings. A
/// failed improvement attempt never destroys the chunked result.
pub struct FinalPassEngine {
    cfg: Arc<PipelineConfig>,
    transcriber: Arc<dyn Transcriber>,
}

impl FinalPassEngine {
    pub fn new(cfg: Arc<PipelineConfig>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self { cfg, transcriber }
    }

    /// Decide whether to re-decode and resolve the transcript. Decode
    /// failures fall back to the chunked transcript; they are never
    /// propagated.
    pub async fn resolve(
        &self,
        all_audio: &[f32],
        chunked: String,
        stats: &DecodeStats,
    ) -> FinalPassOutcome {
        if all_audio.is_empty() {
            return FinalPassOutcome {
                transcript: chunked,
                skip_notice: None,
            };
        }

        let audio_secs = all_audio.len() as f64 / SAMPLE_RATE as f64;
        let low_conf_ratio = stats.low_conf_ratio();

        let in_bounds = audio_secs >= self.cfg.final_pass_min_sec
            && audio_secs <= self.cfg.final_pass_max_sec;
        let degraded = chunked.is_empty()
            || is_repetition_loop(&chunked)
            || low_conf_ratio >= LOW_CONF_RATIO_TRIGGER;

        if in_bounds && degraded && audio_secs >= MIN_DECODE_SEC {
            let transcript = self.run_full_pass(all_audio, chunked).await;
            return FinalPassOutcome {
                transcript,
                skip_notice: None,
            };
        }

        let skip_notice = if audio_secs > self.cfg.final_pass_max_sec {
            let notice = format!(
                "[final] skipping full pass: recording {:.1}s > {:.0}s",
                audio_secs, self.cfg.final_pass_max_sec
            );
            info!("{}", notice);
            Some(notice)
        } else {
            None
        };

        FinalPassOutcome {
            transcript: chunked,
            skip_notice,
        }
    }

    /// Full re-decode with the temperature ladder; a loopy result gets one
    /// safe-pass attempt before falling back to the chunked transcript.
    async fn run_full_pass(&self, all_audio: &[f32], chunked: String) -> String {
        let full_text = match self.full_pass(all_audio).await {
            Ok(text) => text,
            Err(e) => {
                warn!("[final] falling back to chunked transcript: {:#}", e);
                return chunked;
            }
        };

        if full_text.is_empty() {
            return chunked;
        }

        if !is_repetition_loop(&full_text) {
            info!("[final] {}", full_text);
            return full_text;
        }

        info!("[final] repetition loop detected, trying safe pass");
        match self.safe_pass(all_audio).await {
            Ok(safe_text) if !safe_text.is_empty() && !is_repetition_loop(&safe_text) => {
                info!("[final-safe] {}", safe_text);
                safe_text
            }
            Ok(_) => {
                info!("[final] loop persisted, falling back to chunked transcript");
                chunked
            }
            Err(e) => {
                warn!("[final] safe pass failed, falling back to chunked transcript: {:#}", e);
                chunked
            }
        }
    }

    /// Whole recording, temperature ladder, hotword prompt, no conditioning
    /// on previous text (that mode loops less).
    async fn full_pass(&self, all_audio: &[f32]) -> Result<String> {
        let output = self
            .transcriber
            .transcribe(DecodeRequest {
                samples: all_audio.to_vec(),
                language: self.cfg.language.clone(),
                prompt: Some(self.cfg.hotwords.clone()),
                temperature: Temperature::Ladder(FINAL_TEMPERATURES.to_vec()),
                condition_on_previous_text: false,
            })
            .await?;
        Ok(output.text.trim().to_string())
    }

    /// Conservative re-decode used to escape a final-pass loop: no prompt,
    /// temperature 0.
    async fn safe_pass(&self, all_audio: &[f32]) -> Result<String> {
        let output = self
            .transcriber
            .transcribe(DecodeRequest {
                samples: all_audio.to_vec(),
                language: self.cfg.language.clone(),
                prompt: None,
                temperature: Temperature::Fixed(0.0),
                condition_on_previous_text: false,
            })
            .await?;
        Ok(output.text.trim().to_string())
    }
}
