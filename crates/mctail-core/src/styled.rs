//! Append-only, then overlay-mutable, colorized text buffer.
//!
//! A [`StyledText`] holds the rendered form of one message as an ordered
//! sequence of (text, color) runs plus the plain-text projection used for
//! pattern matching. It is created once per message, mutated through
//! rendering and optional highlighting, and consumed exactly once by the
//! output sink.

use crate::color::Color;

/// A contiguous span of text sharing one color.
///
/// Runs store only their length; the text itself lives in one buffer so the
/// plain projection is always the concatenation of all runs by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    len: usize,
    color: Color,
}

/// Styled output block for a single rendered message.
#[derive(Debug, Default)]
pub struct StyledText {
    text: String,
    runs: Vec<Run>,
    color_stack: Vec<Color>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plain-text projection of every run, in order.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the plain-text projection in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The color used by appends that do not name one explicitly.
    fn current_color(&self) -> Color {
        self.color_stack.last().copied().unwrap_or(Color::Default)
    }

    /// Appends text in the current ambient color.
    pub fn append(&mut self, text: &str) {
        self.append_with(text, self.current_color());
    }

    /// Appends text in an explicit color.
    pub fn append_with(&mut self, text: &str, color: Color) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        self.push_run(text.len(), color);
    }

    /// Appends a single character in the current ambient color.
    pub fn push_char(&mut self, ch: char) {
        let color = self.current_color();
        self.text.push(ch);
        self.push_run(ch.len_utf8(), color);
    }

    /// Appends another styled block verbatim, preserving its run colors.
    ///
    /// The ambient color stack does not apply to the spliced-in runs.
    pub fn extend(&mut self, other: StyledText) {
        self.text.push_str(&other.text);
        for run in other.runs {
            self.push_run(run.len, run.color);
        }
    }

    /// Makes `color` the default for subsequent appends until popped.
    pub fn push_color(&mut self, color: Color) {
        self.color_stack.push(color);
    }

    /// Restores the previous ambient color.
    ///
    /// Popping with an empty stack is a programming error: pushes and pops
    /// must balance within a single render.
    pub fn pop_color(&mut self) {
        debug_assert!(!self.color_stack.is_empty(), "unbalanced pop_color");
        self.color_stack.pop();
    }

    /// Recolors exactly `[offset, offset + len)` in the plain projection,
    /// splitting runs as needed. Text content is unchanged; overlay writes
    /// are last-write-wins on every byte they cover.
    ///
    /// Offsets are always derived from this object's own projection, so an
    /// out-of-bounds range is a contract violation, not a runtime error.
    pub fn overlay(&mut self, offset: usize, len: usize, color: Color) {
        debug_assert!(
            offset.saturating_add(len) <= self.text.len(),
            "overlay out of bounds"
        );
        if len == 0 {
            return;
        }
        let end = (offset + len).min(self.text.len());

        let mut out = Vec::with_capacity(self.runs.len() + 2);
        let mut pos = 0;
        for run in &self.runs {
            let run_start = pos;
            let run_end = pos + run.len;
            pos = run_end;

            let a = run_start.max(offset);
            let b = run_end.min(end);
            if a >= b {
                push_merged(&mut out, *run);
                continue;
            }
            if run_start < a {
                push_merged(
                    &mut out,
                    Run {
                        len: a - run_start,
                        color: run.color,
                    },
                );
            }
            push_merged(&mut out, Run { len: b - a, color });
            if b < run_end {
                push_merged(
                    &mut out,
                    Run {
                        len: run_end - b,
                        color: run.color,
                    },
                );
            }
        }
        self.runs = out;
    }

    /// Iterates the runs as (text slice, color) pairs, in order.
    pub fn runs(&self) -> impl Iterator<Item = (&str, Color)> {
        let mut pos = 0;
        self.runs.iter().map(move |run| {
            let chunk = &self.text[pos..pos + run.len];
            pos += run.len;
            (chunk, run.color)
        })
    }

    fn push_run(&mut self, len: usize, color: Color) {
        push_merged(&mut self.runs, Run { len, color });
    }
}

/// Appends a run, merging with the previous one when colors match.
fn push_merged(runs: &mut Vec<Run>, run: Run) {
    if let Some(last) = runs.last_mut()
        && last.color == run.color
    {
        last.len += run.len;
        return;
    }
    runs.push(run);
}
