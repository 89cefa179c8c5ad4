pub mod audio;
pub mod config;
pub mod session;
pub mod sink;
pub mod text;
pub mod transcribe;

pub use audio::{CaptureSource, ChunkBuffer, WavFileSource};
pub use config::PipelineConfig;
pub use session::{
    DecodeStats, FinalPassEngine, PerfSummary, RecordingSession, SessionOutcome, SessionState,
    StateCell, StreamingWorker, WorkerOutcome,
};
pub use sink::LogSink;
pub use transcribe::{DecodeOutput, DecodeRequest, SegmentScore, Temperature, Transcriber};
