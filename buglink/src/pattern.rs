//! Bug-ID pattern compilation and extraction
//!
//! The ID-matching pattern is administrator-configured, so compilation
//! problems are configuration errors. Extraction is a pure function
//! over one match's capture groups, kept separate from the annotation
//! loop so it can be tested directly.

use regex::{Captures, Regex};

use crate::error::{BuglinkError, Result};

/// Default bug-ID pattern: one or more digits, optionally
/// dot-separated, as a whole word.
pub const DEFAULT_ID_PATTERN: &str = r"\b[0-9.]*[0-9]\b";

/// Compile an administrator-configured bug-ID pattern.
///
/// Rejects syntactically invalid patterns and patterns that can match
/// the empty string (those would annotate between every character).
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    if pattern.trim().is_empty() {
        return Err(BuglinkError::Config("no bug ID pattern".to_string()));
    }
    let regex = Regex::new(pattern)
        .map_err(|e| BuglinkError::Config(format!("pattern cannot be compiled: {e}")))?;
    if regex.is_match("") {
        return Err(BuglinkError::Config(format!(
            "pattern '{pattern}' matches zero-length text"
        )));
    }
    Ok(regex)
}

/// Derive a bug ID from one match's capture groups.
///
/// Groups are tried left to right starting with group 0 (the whole
/// match); the first one that parses as a non-negative integer wins.
/// This supports patterns where the numeric ID is embedded among
/// decoration, e.g. `bug #(\d+)`. `None` means the match carries no
/// usable ID, which is not an error.
pub fn id_from_match(caps: &Captures<'_>) -> Option<u64> {
    (0..caps.len()).find_map(|i| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok()))
}
