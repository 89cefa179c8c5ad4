use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::config::PipelineConfig;

/// Append-only, timestamped log file. Persistence is best-effort: a write
/// failure is logged and swallowed, it must never fail the session.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    enabled: bool,
}

impl LogSink {
    /// Sink for accepted final transcripts.
    pub fn transcript(cfg: &PipelineConfig) -> Self {
        Self {
            path: cfg.transcript_log.clone(),
            enabled: cfg.save_transcripts,
        }
    }

    /// Sink for performance summaries and final-pass skip notices.
    pub fn perf(cfg: &PipelineConfig) -> Self {
        Self {
            path: cfg.perf_log.clone(),
            enabled: cfg.save_perf_log,
        }
    }

    /// Append one timestamped line, if this sink is enabled.
    pub fn append(&self, text: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.write_line(text) {
            warn!("Failed to write {:?}: {:#}", self.path, e);
        }
    }

    fn write_line(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file: {:?}", self.path))?;
        writeln!(file, "[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), text)
            .context("Failed to append log line")?;
        Ok(())
    }
}
