//! Compile-once search patterns.
//!
//! Two pattern instances exist at startup: one restricting which channel
//! names to attach to, and one matched against rendered message text. Both
//! follow the same compile/validate rules and are built exactly once.
//! Syntax is the `regex` crate's; `find_iter` gives the leftmost-first,
//! non-overlapping scan the highlighter relies on.

use regex::Regex;

/// A (byte offset, length) pair into a rendered block's plain projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub offset: usize,
    pub len: usize,
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
}

impl Pattern {
    /// Compiles `raw`, treating the empty string as "no pattern".
    ///
    /// Malformed syntax is a startup-time fatal condition for the tool, but
    /// this constructor only reports it; the entry point decides to exit.
    pub fn compile(raw: &str) -> Result<Option<Self>, PatternError> {
        if raw.is_empty() {
            return Ok(None);
        }
        match Regex::new(raw) {
            Ok(re) => Ok(Some(Self { re })),
            Err(source) => Err(PatternError {
                pattern: raw.to_string(),
                source,
            }),
        }
    }

    /// All non-overlapping matches in `text`, left to right.
    pub fn find_all(&self, text: &str) -> Vec<MatchSpan> {
        self.re
            .find_iter(text)
            .map(|m| MatchSpan {
                offset: m.start(),
                len: m.len(),
            })
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }
}

/// Invalid pattern syntax, reported with the offending pattern.
#[derive(Debug)]
pub struct PatternError {
    pattern: String,
    source: regex::Error,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid pattern \"{}\"", self.pattern)
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
