use crate::config::PipelineConfig;

/// Classify a decoded fragment as a silence-induced hallucination.
///
/// Near-silent audio makes decoders emit short stock phrases ("Thank you.",
/// "..."). A fragment is hallucinated silence when the mean no-speech
/// probability clears the configured threshold AND the cleaned text is short
/// enough to be a stock phrase. Empty text is never flagged; the worker
/// already ignores it.
pub fn is_silence_hallucination(text: &str, avg_no_speech: f64, cfg: &PipelineConfig) -> bool {
    if text.is_empty() {
        return false;
    }
    avg_no_speech >= cfg.silence_skip_no_speech
        && text.trim().chars().count() <= cfg.silence_skip_max_chars
}
