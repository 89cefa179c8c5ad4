use serde::{Deserialize, Serialize};

/// Aggregate decode statistics for one recording session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Seconds of audio pushed through the decoder.
    pub processed_audio_secs: f64,

    /// Wall-clock seconds spent inside decode calls.
    pub decode_secs: f64,

    /// Fragments decoded (accepted or not).
    pub decoded_chunks: usize,

    /// Fragments whose mean avg_logprob fell at or below the configured floor.
    pub low_conf_chunks: usize,
}

impl DecodeStats {
    pub fn record_chunk(&mut self, audio_secs: f64, decode_secs: f64, low_confidence: bool) {
        self.processed_audio_secs += audio_secs;
        self.decode_secs += decode_secs;
        self.decoded_chunks += 1;
        if low_confidence {
            self.low_conf_chunks += 1;
        }
    }

    /// Share of decoded chunks that came back low-confidence; 0 when nothing
    /// was decoded.
    pub fn low_conf_ratio(&self) -> f64 {
        if self.decoded_chunks == 0 {
            0.0
        } else {
            self.low_conf_chunks as f64 / self.decoded_chunks as f64
        }
    }

    /// Real-time factor: decode time over audio duration. >1 means the
    /// decoder lags real time.
    pub fn rtf(&self) -> f64 {
        if self.processed_audio_secs > 0.0 {
            self.decode_secs / self.processed_audio_secs
        } else {
            0.0
        }
    }
}

/// One-line performance summary emitted when a session completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfSummary {
    pub processed_audio_secs: f64,
    pub decode_secs: f64,
    pub rtf: f64,
    pub wall_secs: f64,
}

impl PerfSummary {
    pub fn from_stats(stats: &DecodeStats, wall_secs: f64) -> Self {
        Self {
            processed_audio_secs: stats.processed_audio_secs,
            decode_secs: stats.decode_secs,
            rtf: stats.rtf(),
            wall_secs,
        }
    }

    /// Render the log-file line.
    pub fn line(&self) -> String {
        format!(
            "[perf] processed {:.1}s of audio in {:.2}s (RTF={:.2}x), recording ran {:.1}s",
            self.processed_audio_secs, self.decode_secs, self.rtf, self.wall_secs
        )
    }
}
