// Integration tests for the final-pass engine: the skip/run decision matrix,
// the safe-pass escape hatch, and failure fallbacks.

mod common;

use common::{loop_text, output, speech, ScriptedTranscriber};
use sotto::{DecodeStats, FinalPassEngine, PipelineConfig, Temperature};
use std::sync::Arc;

fn engine_with(transcriber: Arc<ScriptedTranscriber>) -> FinalPassEngine {
    FinalPassEngine::new(Arc::new(PipelineConfig::default()), transcriber)
}

fn stats_with_ratio(decoded: usize, low_conf: usize) -> DecodeStats {
    DecodeStats {
        processed_audio_secs: decoded as f64 * 10.0,
        decode_secs: 1.0,
        decoded_chunks: decoded,
        low_conf_chunks: low_conf,
    }
}

#[tokio::test]
async fn short_recording_skips_even_a_loopy_transcript() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    let engine = engine_with(transcriber.clone());

    // 10s < default 15s minimum
    let outcome = engine
        .resolve(&speech(10.0), loop_text(), &stats_with_ratio(1, 0))
        .await;

    assert_eq!(outcome.transcript, loop_text());
    assert!(outcome.skip_notice.is_none());
    assert_eq!(transcriber.request_count(), 0);
}

#[tokio::test]
async fn over_long_recording_skips_with_notice() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    let engine = engine_with(transcriber.clone());

    let outcome = engine
        .resolve(&speech(100.0), String::new(), &stats_with_ratio(10, 0))
        .await;

    assert_eq!(outcome.transcript, "");
    let notice = outcome.skip_notice.expect("skip notice for over-max recording");
    assert!(notice.contains("100.0s"));
    assert_eq!(transcriber.request_count(), 0);
}

#[tokio::test]
async fn healthy_transcript_in_bounds_is_left_alone() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    let engine = engine_with(transcriber.clone());

    let chunked = "a healthy clean transcript".to_string();
    let outcome = engine
        .resolve(&speech(40.0), chunked.clone(), &stats_with_ratio(4, 0))
        .await;

    assert_eq!(outcome.transcript, chunked);
    assert_eq!(transcriber.request_count(), 0);
}

#[tokio::test]
async fn empty_transcript_triggers_full_pass_and_survives_its_failure() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_error("decoder fell over");
    let engine = engine_with(transcriber.clone());

    let outcome = engine
        .resolve(&speech(40.0), String::new(), &stats_with_ratio(4, 0))
        .await;

    // Failure falls back to the (empty) chunked transcript, no error.
    assert_eq!(outcome.transcript, "");
    assert_eq!(transcriber.request_count(), 1);
}

#[tokio::test]
async fn full_pass_uses_ladder_hotwords_and_no_conditioning() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_text("the recovered full transcript.");
    let cfg = PipelineConfig::default();
    let hotwords = cfg.hotwords.clone();
    let engine = FinalPassEngine::new(Arc::new(cfg), transcriber.clone());

    let outcome = engine
        .resolve(&speech(40.0), String::new(), &stats_with_ratio(4, 0))
        .await;

    assert_eq!(outcome.transcript, "the recovered full transcript.");

    let requests = transcriber.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].temperature,
        Temperature::Ladder(vec![0.0, 0.2, 0.4, 0.6])
    );
    assert_eq!(requests[0].prompt.as_deref(), Some(hotwords.as_str()));
    assert!(!requests[0].condition_on_previous_text);
    assert_eq!(requests[0].samples.len(), speech(40.0).len());
}

#[tokio::test]
async fn low_confidence_ratio_triggers_full_pass() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_text("much better text.");
    let engine = engine_with(transcriber.clone());

    // 2 of 4 chunks low confidence: ratio 0.5 >= 0.35
    let outcome = engine
        .resolve(
            &speech(40.0),
            "shaky chunked text".to_string(),
            &stats_with_ratio(4, 2),
        )
        .await;

    assert_eq!(outcome.transcript, "much better text.");
}

#[tokio::test]
async fn loopy_full_pass_escapes_through_safe_pass() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_text(&loop_text()); // full pass loops too
    transcriber.push_text("the clean safe pass text."); // safe pass is clean
    let engine = engine_with(transcriber.clone());

    let outcome = engine
        .resolve(&speech(20.0), loop_text(), &stats_with_ratio(2, 0))
        .await;

    assert_eq!(outcome.transcript, "the clean safe pass text.");

    let requests = transcriber.requests();
    assert_eq!(requests.len(), 2);
    // Safe pass: no prompt, temperature 0, no conditioning.
    assert!(requests[1].prompt.is_none());
    assert_eq!(requests[1].temperature, Temperature::Fixed(0.0));
    assert!(!requests[1].condition_on_previous_text);
}

#[tokio::test]
async fn loopy_safe_pass_falls_back_to_chunked() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_text(&loop_text());
    transcriber.push_text(&loop_text());
    let engine = engine_with(transcriber.clone());

    let chunked = loop_text();
    let outcome = engine
        .resolve(&speech(20.0), chunked.clone(), &stats_with_ratio(2, 0))
        .await;

    assert_eq!(outcome.transcript, chunked);
}

#[tokio::test]
async fn empty_full_pass_keeps_chunked_transcript() {
    let transcriber = Arc::new(ScriptedTranscriber::new());
    transcriber.push_output(output("", 0.0, 0.0));
    let engine = engine_with(transcriber.clone());

    let outcome = engine
        .resolve(&speech(40.0), String::new(), &stats_with_ratio(4, 0))
        .await;

    assert_eq!(outcome.transcript, "");
}
