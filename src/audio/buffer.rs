use std::sync::Mutex;

use crate::config::SAMPLE_RATE;

/// Thread-safe append-only store of captured audio segments.
///
/// The capture callback appends one segment per audio block; the streaming
/// worker consumes them through a monotonic read cursor. The full segment
/// history stays available for the end-of-recording full re-decode, so
/// nothing is ever removed.
///
/// The capture side runs on a latency-sensitive audio thread, so every
/// operation here is a single short mutex critical section with no I/O.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    segments: Mutex<Vec<Vec<f32>>>,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self {
            segments: Mutex::new(Vec::new()),
        }
    }

    /// Append one captured segment. Called from the capture context.
    pub fn append(&self, segment: Vec<f32>) {
        let mut segments = self.segments.lock().expect("chunk buffer poisoned");
        segments.push(segment);
    }

    /// Take every segment appended since `cursor`, concatenated into one
    /// sample run, together with the advanced cursor. Returns `None` samples
    /// when nothing new arrived. Successive calls with the returned cursor
    /// never see the same segment twice.
    pub fn take_new(&self, cursor: usize) -> (usize, Option<Vec<f32>>) {
        let segments = self.segments.lock().expect("chunk buffer poisoned");
        let total = segments.len();
        if cursor >= total {
            return (cursor, None);
        }
        let samples: Vec<f32> = segments[cursor..total].concat();
        (total, Some(samples))
    }

    /// Concatenation of every segment ever appended, for the full re-decode.
    pub fn snapshot_all(&self) -> Vec<f32> {
        let segments = self.segments.lock().expect("chunk buffer poisoned");
        segments.concat()
    }

    /// Number of segments appended so far.
    pub fn segment_count(&self) -> usize {
        self.segments.lock().expect("chunk buffer poisoned").len()
    }

    /// Total captured duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        let segments = self.segments.lock().expect("chunk buffer poisoned");
        let samples: usize = segments.iter().map(|s| s.len()).sum();
        samples as f64 / SAMPLE_RATE as f64
    }
}
