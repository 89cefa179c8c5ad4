//! Detection and repair of decoder repetition loops.
//!
//! Decoders occasionally latch onto a short phrase and emit it dozens of
//! times. Detection combines four independent signals by logical OR; repair
//! collapses consecutive repeats of a short phrase down to one occurrence.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Texts with fewer tokens than this are never flagged (insufficient signal).
const MIN_TOKENS: usize = 12;

/// Back-to-back repetitions of one n-gram that flag a loop.
const RUN_REPEATS: usize = 5;

/// Occurrence floor for the coverage-weighted modal n-gram signal.
const MODAL_COUNT: usize = 10;

/// Token-coverage floor for the modal n-gram signal.
const MODAL_COVERAGE: f64 = 0.08;

/// Total occurrences of an immediately repeated 1-3 token phrase that flag a loop.
const SHORT_PHRASE_REPEATS: usize = 7;

/// Longest phrase considered by the short-phrase and collapse passes.
const SHORT_PHRASE_MAX_TOKENS: usize = 3;

/// Numeric-placeholder artifact token the decoder floods degenerate output with.
const PLACEHOLDER_TOKEN: &str = "$0";

/// Occurrence floor for the placeholder-flood signal.
const PLACEHOLDER_COUNT: usize = 6;

/// Token-share floor for the placeholder-flood signal.
const PLACEHOLDER_RATIO: f64 = 0.04;

/// Consecutive repeats at which the collapse pass rewrites a run.
const COLLAPSE_REPEATS: usize = 4;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w$]+").expect("valid token pattern"))
}

/// Word-like tokens (alphanumeric plus currency-digit artifacts), lowercased.
fn tokenize(text: &str) -> Vec<String> {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// True when `text` looks like a pathological decoder loop.
pub fn is_repetition_loop(text: &str) -> bool {
    let tokens = tokenize(text);
    if tokens.len() < MIN_TOKENS {
        return false;
    }

    has_consecutive_ngram_run(&tokens)
        || has_dominant_modal_ngram(&tokens)
        || has_short_phrase_run(&tokens)
        || has_placeholder_flood(&tokens)
}

/// Longest back-to-back run of the same n-gram starting inside `tokens`.
fn max_consecutive_repeat(tokens: &[String], n: usize) -> usize {
    if n == 0 || tokens.len() < 2 * n {
        return 1;
    }
    let mut best = 1;
    let mut i = 0;
    let end = tokens.len() - 2 * n;
    while i <= end {
        let gram = &tokens[i..i + n];
        let mut j = i + n;
        let mut run = 1;
        while j + n <= tokens.len() && &tokens[j..j + n] == gram {
            run += 1;
            j += n;
        }
        if run > best {
            best = run;
        }
        i = if run == 1 { i + 1 } else { j };
    }
    best
}

/// Signal 1: some n-gram repeats back-to-back at least `RUN_REPEATS` times.
/// Scans every phrase length that could still fit that many repeats, so a
/// long sentence stuck on repeat is caught as well as a two-word stutter.
fn has_consecutive_ngram_run(tokens: &[String]) -> bool {
    let max_n = tokens.len() / RUN_REPEATS;
    (2..=max_n).any(|n| max_consecutive_repeat(tokens, n) >= RUN_REPEATS)
}

/// Signal 2: the single most frequent bigram/trigram covers a noticeable
/// share of the text, even when the repeats are not adjacent.
fn has_dominant_modal_ngram(tokens: &[String]) -> bool {
    for n in [2usize, 3] {
        if tokens.len() < n {
            continue;
        }
        let mut counts: HashMap<&[String], usize> = HashMap::new();
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
        let modal = counts.values().copied().max().unwrap_or(0);
        if modal >= MODAL_COUNT
            && (modal * n) as f64 / tokens.len().max(1) as f64 >= MODAL_COVERAGE
        {
            return true;
        }
    }
    false
}

/// Signal 3: a short construction (1-3 tokens) immediately repeated many
/// times, e.g. "won $0 won $0 won $0 ...".
fn has_short_phrase_run(tokens: &[String]) -> bool {
    (1..=SHORT_PHRASE_MAX_TOKENS)
        .any(|n| max_consecutive_repeat(tokens, n) >= SHORT_PHRASE_REPEATS)
}

/// Signal 4: abnormally many placeholder artifacts.
fn has_placeholder_flood(tokens: &[String]) -> bool {
    let hits = tokens
        .iter()
        .filter(|t| t.as_str() == PLACEHOLDER_TOKEN || t.ends_with(PLACEHOLDER_TOKEN))
        .count();
    hits >= PLACEHOLDER_COUNT && hits as f64 / tokens.len() as f64 >= PLACEHOLDER_RATIO
}

/// Collapse any run of `COLLAPSE_REPEATS`-or-more consecutive repeats of a
/// 1-3 token phrase down to a single occurrence, iterating to a fixed point.
/// Best-effort cosmetic repair applied to the final chosen transcript.
pub fn collapse_repetition_loop(text: &str) -> String {
    let mut cur = text.to_string();
    while let Some(next) = collapse_once(&cur) {
        cur = next;
    }
    cur
}

/// One leftmost collapse rewrite, or `None` when no run remains.
fn collapse_once(text: &str) -> Option<String> {
    // Token byte spans over the original text; comparison is case-insensitive.
    let spans: Vec<(usize, usize, String)> = token_regex()
        .find_iter(text)
        .map(|m| (m.start(), m.end(), m.as_str().to_lowercase()))
        .collect();
    let len = spans.len();

    let phrase_eq = |a: usize, b: usize, n: usize| -> bool {
        (0..n).all(|k| spans[a + k].2 == spans[b + k].2)
    };

    for i in 0..len {
        // Longest phrase first, like a greedy match.
        for n in (1..=SHORT_PHRASE_MAX_TOKENS).rev() {
            if i + 2 * n > len {
                continue;
            }
            let mut j = i + n;
            let mut run = 1;
            while j + n <= len && phrase_eq(i, j, n) {
                run += 1;
                j += n;
            }
            if run >= COLLAPSE_REPEATS {
                // Keep the first occurrence, drop everything through the
                // end of the last repeat.
                let keep_end = spans[i + n - 1].1;
                let drop_end = spans[j - 1].1;
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..keep_end]);
                out.push_str(&text[drop_end..]);
                return Some(out);
            }
        }
    }
    None
}
