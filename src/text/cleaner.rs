use crate::config::PROMPT_TAIL_CHARS;

/// Strip boundary artifacts the decoder leaves at chunk edges: leading and
/// trailing whitespace, periods, and ellipses.
pub fn clean_fragment(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '…')
}

/// Clean each fragment, drop the empties, and join the rest with single
/// spaces, preserving chronological order.
pub fn join_fragments<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| clean_fragment(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Short rolling prompt for streaming chunk decodes: the fixed hotword list
/// plus the trailing context of the transcript so far. Stabilizes
/// mixed-vocabulary decoding and proper nouns across chunk boundaries.
pub fn rolling_prompt<S: AsRef<str>>(hotwords: &str, parts: &[S]) -> String {
    let joined = join_fragments(parts);
    let tail = tail_chars(&joined, PROMPT_TAIL_CHARS);
    if tail.is_empty() {
        hotwords.to_string()
    } else {
        format!("{}\n{}", hotwords, tail)
    }
}

/// Last `n` characters of `s`, respecting char boundaries.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
