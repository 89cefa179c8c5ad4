//! Transcript text normalization and loop-artifact analysis.

mod cleaner;
mod repetition;

pub use cleaner::{clean_fragment, join_fragments, rolling_prompt};
pub use repetition::{collapse_repetition_loop, is_repetition_loop};
