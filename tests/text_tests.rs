// Integration tests for transcript text handling: fragment joining, the
// silence-hallucination gate, and repetition-loop detection/repair.

use sotto::text::{collapse_repetition_loop, is_repetition_loop, join_fragments};
use sotto::transcribe::is_silence_hallucination;
use sotto::PipelineConfig;

#[test]
fn fragments_join_with_boundary_artifacts_stripped() {
    let parts = vec![".hello.", "  world...", ""];
    assert_eq!(join_fragments(&parts), "hello world");
}

#[test]
fn silence_gate_default_thresholds() {
    let cfg = PipelineConfig::default();
    assert!(is_silence_hallucination("Thank you.", 0.9, &cfg));
    assert!(!is_silence_hallucination(
        "a long genuine sentence about the weather today",
        0.9,
        &cfg
    ));
}

#[test]
fn long_phrase_repeated_eight_times_is_a_loop() {
    let phrase: Vec<String> = (0..20).map(|i| format!("word{}", i)).collect();
    let text = vec![phrase.join(" "); 8].join(" ");
    assert!(is_repetition_loop(&text));
}

#[test]
fn natural_prose_is_not_a_loop() {
    let text: String = (0..50)
        .map(|i| format!("distinct{}", i))
        .collect::<Vec<_>>()
        .join(" ");
    assert!(!is_repetition_loop(&text));
}

#[test]
fn collapse_is_a_fixed_point() {
    let text = "sure sure sure sure sure and then we moved on to the agenda";
    let once = collapse_repetition_loop(text);
    assert_eq!(collapse_repetition_loop(&once), once);
    assert_eq!(once, "sure and then we moved on to the agenda");
}
