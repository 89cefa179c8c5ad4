use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::SAMPLE_RATE;

/// Audio capture seam.
///
/// The live microphone is owned by the embedding application; the pipeline
/// only needs something that delivers fixed-format (mono, 16 kHz, f32)
/// sample blocks in chronological order. A failed `start` surfaces before
/// any session state exists.
#[async_trait::async_trait]
pub trait CaptureSource: Send + Sync {
    /// Start capturing. Returns a receiver of sample blocks; the channel
    /// closes when the source is exhausted or stopped.
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<f32>>>;

    /// Stop capturing.
    async fn stop(&mut self) -> Result<()>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Replays a 16 kHz mono WAV file in 100 ms blocks, for batch processing
/// and tests.
pub struct WavFileSource {
    path: PathBuf,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl WavFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            task: None,
        }
    }

    /// Read the whole file as mono f32 samples at the pipeline rate.
    pub fn read_samples(path: &PathBuf) -> Result<Vec<f32>> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {:?}", path))?;
        let spec = reader.spec();

        if spec.channels != 1 {
            bail!("Expected mono WAV, got {} channels", spec.channels);
        }
        if spec.sample_rate != SAMPLE_RATE {
            bail!(
                "Expected {} Hz WAV, got {} Hz",
                SAMPLE_RATE,
                spec.sample_rate
            );
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read float samples")?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .context("Failed to read integer samples")?
            }
        };

        Ok(samples)
    }
}

#[async_trait::async_trait]
impl CaptureSource for WavFileSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<f32>>> {
        let samples = Self::read_samples(&self.path)?;
        info!(
            "WAV source started: {:?} ({:.1}s)",
            self.path,
            samples.len() as f64 / SAMPLE_RATE as f64
        );

        // 100ms blocks, matching a typical capture callback cadence.
        let block = SAMPLE_RATE as usize / 10;
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            for chunk in samples.chunks(block) {
                if tx.send(chunk.to_vec()).await.is_err() {
                    break;
                }
            }
        });
        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
