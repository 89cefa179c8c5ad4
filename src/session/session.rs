use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::audio::ChunkBuffer;
use crate::config::PipelineConfig;
use crate::sink::LogSink;
use crate::text::{collapse_repetition_loop, is_repetition_loop};
use crate::transcribe::Transcriber;

use super::final_pass::FinalPassEngine;
use super::state::{SessionState, StateCell};
use super::stats::{DecodeStats, PerfSummary};
use super::worker::{StreamingWorker, WorkerOutcome};

/// Everything a completed session hands to the external sink.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// The final cleaned transcript; empty when no usable audio was captured.
    pub transcript: String,

    pub stats: DecodeStats,

    pub perf: PerfSummary,
}

/// One recording session: owns the audio buffer, the lifecycle state, and
/// the background decode worker. The system supports exactly one active
/// session at a time; a session cannot be restarted once it has left the
/// idle state.
pub struct RecordingSession {
    id: String,
    cfg: Arc<PipelineConfig>,
    buffer: Arc<ChunkBuffer>,
    state: Arc<StateCell>,
    transcriber: Arc<dyn Transcriber>,
    started_at: Mutex<Option<Instant>>,
    worker: Mutex<Option<JoinHandle<WorkerOutcome>>>,
    transcript_sink: LogSink,
    perf_sink: LogSink,
}

impl RecordingSession {
    pub fn new(cfg: PipelineConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        let transcript_sink = LogSink::transcript(&cfg);
        let perf_sink = LogSink::perf(&cfg);
        Self {
            id: format!("rec-{}", Uuid::new_v4()),
            cfg: Arc::new(cfg),
            buffer: Arc::new(ChunkBuffer::new()),
            state: Arc::new(StateCell::new()),
            transcriber,
            started_at: Mutex::new(None),
            worker: Mutex::new(None),
            transcript_sink,
            perf_sink,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// The buffer the capture context appends into.
    pub fn buffer(&self) -> Arc<ChunkBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Begin recording: log the resolved configuration and spawn the decode
    /// worker. Fails when this session already ran (one live session only).
    pub fn start(&self) -> Result<()> {
        if !self
            .state
            .transition(SessionState::Idle, SessionState::Recording)
        {
            bail!("Session {} already started", self.id);
        }

        info!(
            "Session {} recording: chunk={:.1}s, poll={:.2}s, final-pass={:.0}-{:.0}s",
            self.id,
            self.cfg.chunk_sec,
            self.cfg.worker_poll_sec,
            self.cfg.final_pass_min_sec,
            self.cfg.final_pass_max_sec
        );
        info!(
            "Persistence: transcripts={}, perf={}",
            if self.cfg.save_transcripts { "on" } else { "off" },
            if self.cfg.save_perf_log { "on" } else { "off" }
        );

        *self.started_at.lock().expect("started_at poisoned") = Some(Instant::now());

        let worker = StreamingWorker::new(
            Arc::clone(&self.cfg),
            Arc::clone(&self.buffer),
            Arc::clone(&self.transcriber),
            Arc::clone(&self.state),
        );
        let handle = tokio::spawn(worker.run());
        *self.worker.lock().expect("worker handle poisoned") = Some(handle);

        Ok(())
    }

    /// Stop recording and drive the session to completion: drain the
    /// backlog, run the final-pass engine, repair loop artifacts, persist,
    /// and emit the performance summary.
    pub async fn stop(&self) -> Result<SessionOutcome> {
        if !self
            .state
            .transition(SessionState::Recording, SessionState::Draining)
        {
            bail!("Session {} is not recording", self.id);
        }

        let handle = self
            .worker
            .lock()
            .expect("worker handle poisoned")
            .take();
        let Some(handle) = handle else {
            bail!("Session {} has no worker", self.id);
        };

        // The worker notices the state change on its next tick, drains the
        // backlog and the tail synchronously, then returns.
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Worker task panicked: {}", e);
                self.state.set(SessionState::Complete);
                bail!("Session {} worker failed", self.id);
            }
        };

        self.state.set(SessionState::Finalizing);
        let result = self.finalize(outcome).await;
        self.state.set(SessionState::Complete);
        result
    }

    async fn finalize(&self, outcome: WorkerOutcome) -> Result<SessionOutcome> {
        let WorkerOutcome { transcript, stats } = outcome;

        let engine = FinalPassEngine::new(Arc::clone(&self.cfg), Arc::clone(&self.transcriber));
        let all_audio = self.buffer.snapshot_all();
        let resolved = engine.resolve(&all_audio, transcript, &stats).await;
        if let Some(notice) = &resolved.skip_notice {
            self.perf_sink.append(notice);
        }

        // Last line of defense against loop artifacts, whatever source the
        // transcript came from.
        let mut transcript = resolved.transcript;
        if !transcript.is_empty() && is_repetition_loop(&transcript) {
            let collapsed = collapse_repetition_loop(&transcript).trim().to_string();
            if !collapsed.is_empty() && collapsed != transcript {
                info!("[post] collapsed repeating loop text");
                transcript = collapsed;
            }
        }

        let started_at = *self.started_at.lock().expect("started_at poisoned");
        let wall_secs = started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let perf = PerfSummary::from_stats(&stats, wall_secs);

        if stats.processed_audio_secs > 0.0 {
            let line = perf.line();
            info!("{}", line);
            self.perf_sink.append(&line);
        }

        if transcript.is_empty() {
            info!("Session {} produced no transcript", self.id);
        } else {
            info!("→ {}", transcript);
            self.transcript_sink.append(&transcript);
        }

        Ok(SessionOutcome {
            transcript,
            stats,
            perf,
        })
    }
}
