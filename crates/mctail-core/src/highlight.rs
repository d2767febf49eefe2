//! Match-driven filtering and highlighting of rendered blocks.
//!
//! The pattern is matched against the fully rendered text, attribute labels
//! and hex-formatted numbers included, not just the raw key/value fields.
//! Zero matches suppress the whole message; otherwise every matched span is
//! overlaid with the highlight color and the block passes through unchanged
//! otherwise.

use crate::color::Color;
use crate::pattern::Pattern;
use crate::styled::StyledText;

/// Applies `pattern` to `block`. Returns whether the block should be shown.
///
/// When it returns `true`, every matched span carries `highlight` and all
/// other bytes keep their previous color.
pub fn filter_highlight(block: &mut StyledText, pattern: &Pattern, highlight: Color) -> bool {
    let spans = pattern.find_all(block.text());
    if spans.is_empty() {
        return false;
    }
    for span in spans {
        block.overlay(span.offset, span.len, highlight);
    }
    true
}
