//! The decode service seam.
//!
//! The acoustic model is an external collaborator consumed through a single
//! request/response operation. Implementations wrap whatever inference
//! engine the embedding application ships.

mod gate;

pub use gate::is_silence_hallucination;

use anyhow::Result;

/// Decoding temperature: a fixed value for streaming chunks, or a fallback
/// ladder the decoder climbs on low confidence during the final pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Temperature {
    Fixed(f32),
    Ladder(Vec<f32>),
}

/// One decode request. Samples are mono f32 at the pipeline rate.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub samples: Vec<f32>,
    pub language: String,
    pub prompt: Option<String>,
    pub temperature: Temperature,
    pub condition_on_previous_text: bool,
}

/// Per-segment confidence metrics returned by the decoder.
#[derive(Debug, Clone, Copy)]
pub struct SegmentScore {
    pub avg_logprob: f64,
    pub no_speech_prob: f64,
}

/// Decoder response: text plus per-segment confidence metrics. The segment
/// list may be empty (treated as a no-confidence-signal result).
#[derive(Debug, Clone, Default)]
pub struct DecodeOutput {
    pub text: String,
    pub segments: Vec<SegmentScore>,
}

impl DecodeOutput {
    /// Arithmetic mean of (avg_logprob, no_speech_prob) over all segments;
    /// (0.0, 0.0) when the decoder returned none.
    pub fn quality(&self) -> (f64, f64) {
        if self.segments.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.segments.len() as f64;
        let logprob = self.segments.iter().map(|s| s.avg_logprob).sum::<f64>() / n;
        let no_speech = self.segments.iter().map(|s| s.no_speech_prob).sum::<f64>() / n;
        (logprob, no_speech)
    }
}

/// Stateless request/response decode service.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: DecodeRequest) -> Result<DecodeOutput>;
}
