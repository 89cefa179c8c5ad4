use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::audio::ChunkBuffer;
use crate::config::{PipelineConfig, MIN_DECODE_SEC, SAMPLE_RATE, TAIL_PEAK_FLOOR};
use crate::text::{join_fragments, rolling_prompt};
use crate::transcribe::{is_silence_hallucination, DecodeRequest, Temperature, Transcriber};

use super::state::{SessionState, StateCell};
use super::stats::DecodeStats;

/// What the streaming pass produced: the chronologically joined chunked
/// transcript plus aggregate decode statistics.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub transcript: String,
    pub stats: DecodeStats,
}

/// Background decode loop for one recording session.
///
/// While the session is recording, the worker drains new audio from the
/// `ChunkBuffer` on a fixed cadence and decodes every completed chunk with a
/// rolling prompt. Only new segments are consumed per tick, which bounds the
/// per-tick cost to the new audio rather than the whole recording; when the
/// decoder falls behind real time the backlog is absorbed by the inner
/// chunking loop, never by skipping audio.
pub struct StreamingWorker {
    cfg: Arc<PipelineConfig>,
    buffer: Arc<ChunkBuffer>,
    transcriber: Arc<dyn Transcriber>,
    state: Arc<StateCell>,

    /// Accepted fragment texts, in chronological order.
    parts: Vec<String>,

    /// Carry-over samples not yet long enough to form a decode chunk.
    pending: Vec<f32>,

    /// Segments already consumed from the buffer.
    cursor: usize,

    stats: DecodeStats,
}

impl StreamingWorker {
    pub fn new(
        cfg: Arc<PipelineConfig>,
        buffer: Arc<ChunkBuffer>,
        transcriber: Arc<dyn Transcriber>,
        state: Arc<StateCell>,
    ) -> Self {
        Self {
            cfg,
            buffer,
            transcriber,
            state,
            parts: Vec::new(),
            pending: Vec::new(),
            cursor: 0,
            stats: DecodeStats::default(),
        }
    }

    /// Run the poll/decode loop until the session leaves the recording
    /// state, then drain the backlog and the tail.
    pub async fn run(mut self) -> WorkerOutcome {
        let chunk_samples = self.cfg.chunk_samples();
        let poll = Duration::from_secs_f64(self.cfg.worker_poll_sec);

        while self.state.get() == SessionState::Recording {
            tokio::time::sleep(poll).await;

            if !self.pull_new() {
                continue;
            }
            self.decode_full_chunks(chunk_samples, "chunk").await;
        }

        // Recording stopped: pick up whatever the capture side appended
        // last, then catch up any backlog accumulated while decoding lagged.
        self.pull_new();
        self.decode_full_chunks(chunk_samples, "flush").await;

        // Leftover tail: decode it as one last fragment if it is long enough
        // and not dead air.
        let tail_secs = self.pending.len() as f64 / SAMPLE_RATE as f64;
        let peak = self
            .pending
            .iter()
            .fold(0.0_f32, |acc, s| acc.max(s.abs()));
        if tail_secs >= MIN_DECODE_SEC && peak > TAIL_PEAK_FLOOR {
            let tail = std::mem::take(&mut self.pending);
            self.decode_piece(tail, "tail").await;
        }

        WorkerOutcome {
            transcript: join_fragments(&self.parts),
            stats: self.stats,
        }
    }

    /// Pull segments appended since the last poll into the pending window.
    fn pull_new(&mut self) -> bool {
        let (cursor, new_samples) = self.buffer.take_new(self.cursor);
        self.cursor = cursor;
        match new_samples {
            Some(samples) => {
                self.pending.extend_from_slice(&samples);
                true
            }
            None => false,
        }
    }

    /// Decode every completed chunk in the pending window, leaving the
    /// remainder as carry-over.
    async fn decode_full_chunks(&mut self, chunk_samples: usize, label: &str) {
        while self.pending.len() >= chunk_samples {
            let segment: Vec<f32> = self.pending.drain(..chunk_samples).collect();
            self.decode_piece(segment, label).await;
        }
    }

    /// Decode one chunk with the rolling prompt and fold the result into the
    /// accumulator. A failing decode abandons this chunk but keeps the
    /// session alive.
    async fn decode_piece(&mut self, samples: Vec<f32>, label: &str) {
        let audio_secs = samples.len() as f64 / SAMPLE_RATE as f64;
        let request = DecodeRequest {
            samples,
            language: self.cfg.language.clone(),
            prompt: Some(rolling_prompt(&self.cfg.hotwords, &self.parts)),
            temperature: Temperature::Fixed(0.0),
            condition_on_previous_text: true,
        };

        let started = Instant::now();
        let result = self.transcriber.transcribe(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                warn!("[{}] decode failed: {:#}", label, e);
                return;
            }
        };

        let text = output.text.trim().to_string();
        let (avg_logprob, avg_no_speech) = output.quality();
        self.stats
            .record_chunk(audio_secs, elapsed, avg_logprob <= self.cfg.low_conf_logprob);

        if is_silence_hallucination(&text, avg_no_speech, &self.cfg) {
            let preview: String = text.chars().take(24).collect();
            info!(
                "[{}] skipped (silence): no_speech={:.2}, text='{}'",
                label, avg_no_speech, preview
            );
            return;
        }

        if !text.is_empty() {
            info!("[{}] {}", label, text);
            self.parts.push(text);
        }
    }
}
