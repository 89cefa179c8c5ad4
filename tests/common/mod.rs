// Shared test helpers: a scripted decoder and audio fixtures.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use sotto::{DecodeOutput, DecodeRequest, SegmentScore, Transcriber};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Transcriber double that replays a scripted sequence of replies and
/// records every request it receives.
#[derive(Default)]
pub struct ScriptedTranscriber {
    replies: Mutex<VecDeque<Result<DecodeOutput, String>>>,
    requests: Mutex<Vec<DecodeRequest>>,
}

impl ScriptedTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with one confident segment.
    pub fn push_text(&self, text: &str) {
        self.push_output(output(text, -0.3, 0.05));
    }

    pub fn push_output(&self, out: DecodeOutput) {
        self.replies.lock().unwrap().push_back(Ok(out));
    }

    pub fn push_error(&self, msg: &str) {
        self.replies.lock().unwrap().push_back(Err(msg.to_string()));
    }

    pub fn requests(&self) -> Vec<DecodeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, request: DecodeRequest) -> Result<DecodeOutput> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(out)) => Ok(out),
            Some(Err(msg)) => Err(anyhow!(msg)),
            // Script exhausted: behave like a decoder hearing nothing.
            None => Ok(DecodeOutput::default()),
        }
    }
}

/// Decoder output with one segment carrying the given confidence metrics.
pub fn output(text: &str, avg_logprob: f64, no_speech_prob: f64) -> DecodeOutput {
    DecodeOutput {
        text: text.to_string(),
        segments: vec![SegmentScore {
            avg_logprob,
            no_speech_prob,
        }],
    }
}

/// Audible audio: constant 0.1 amplitude, well above the tail peak floor.
pub fn speech(secs: f64) -> Vec<f32> {
    vec![0.1; (secs * sotto::config::SAMPLE_RATE as f64) as usize]
}

/// Dead air: below the tail peak floor.
pub fn near_silence(secs: f64) -> Vec<f32> {
    vec![0.0005; (secs * sotto::config::SAMPLE_RATE as f64) as usize]
}

/// A 3-word phrase immediately repeated enough times to trip loop detection.
pub fn loop_text() -> String {
    vec!["we won again"; 8].join(" ")
}
