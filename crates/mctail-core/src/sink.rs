//! Serializing styled blocks to a color-capable stream.
//!
//! Each run's color is translated to terminal styling via crossterm; when
//! the destination does not support color, all color information is dropped
//! silently. Every block is flushed immediately so the tool behaves as a
//! live tail of an unbounded, possibly slow, stream — a blocking flush is
//! consumer backpressure, not an error.

use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use crossterm::QueueableCommand;
use crossterm::style::{Color as TermColor, ResetColor, SetForegroundColor};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::styled::StyledText;

/// When to colorize output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colorize when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!(
                "invalid color mode \"{other}\" (expected auto, always or never)"
            )),
        }
    }
}

/// Writes styled blocks to a destination stream, flushing per message.
pub struct OutputSink<W: Write> {
    out: W,
    colorize: bool,
}

impl OutputSink<io::Stdout> {
    /// Sink over stdout, with color capability resolved from `mode`.
    pub fn stdout(mode: ColorMode) -> Self {
        let colorize = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal(),
        };
        OutputSink::new(io::stdout(), colorize)
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(out: W, colorize: bool) -> Self {
        Self { out, colorize }
    }

    /// Serializes the block's runs in order and flushes.
    ///
    /// Consumes the block: no further mutation is valid once a message has
    /// been handed to the sink.
    pub fn write_block(&mut self, block: StyledText) -> io::Result<()> {
        if self.colorize {
            let mut current: Option<Color> = None;
            for (chunk, color) in block.runs() {
                if current != Some(color) {
                    match term_color(color) {
                        Some(c) => self.out.queue(SetForegroundColor(c))?,
                        None => self.out.queue(ResetColor)?,
                    };
                    current = Some(color);
                }
                self.out.write_all(chunk.as_bytes())?;
            }
            self.out.queue(ResetColor)?;
        } else {
            self.out.write_all(block.text().as_bytes())?;
        }
        self.out.flush()
    }
}

fn term_color(color: Color) -> Option<TermColor> {
    match color {
        Color::Default => None,
        Color::Red => Some(TermColor::Red),
        Color::Green => Some(TermColor::Green),
        Color::Yellow => Some(TermColor::Yellow),
        Color::Blue => Some(TermColor::Blue),
        Color::Magenta => Some(TermColor::Magenta),
        Color::Cyan => Some(TermColor::Cyan),
        Color::White => Some(TermColor::White),
        Color::DarkGray => Some(TermColor::DarkGrey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StyledText {
        let mut t = StyledText::new();
        t.append_with("{\n", Color::Blue);
        t.append_with("  x\n", Color::White);
        t.append_with("}\n", Color::Blue);
        t
    }

    /// Plain mode writes the projection verbatim, no escape sequences.
    #[test]
    fn test_plain_mode_no_escapes() {
        let mut buf = Vec::new();
        OutputSink::new(&mut buf, false).write_block(sample()).unwrap();
        assert_eq!(buf, b"{\n  x\n}\n");
    }

    /// Color mode emits escape sequences around runs and resets at the end.
    #[test]
    fn test_color_mode_emits_escapes() {
        let mut buf = Vec::new();
        OutputSink::new(&mut buf, true).write_block(sample()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains('\u{1b}'));
        assert!(s.contains("{\n"));
        assert!(s.ends_with("\u{1b}[0m"));
    }

    /// Color mode preserves the plain projection once escapes are removed.
    #[test]
    fn test_color_mode_preserves_text() {
        let mut buf = Vec::new();
        OutputSink::new(&mut buf, true).write_block(sample()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let stripped: String = {
            let mut out = String::new();
            let mut in_escape = false;
            for ch in s.chars() {
                match ch {
                    '\u{1b}' => in_escape = true,
                    'm' if in_escape => in_escape = false,
                    _ if in_escape => {}
                    _ => out.push(ch),
                }
            }
            out
        };
        assert_eq!(stripped, "{\n  x\n}\n");
    }

    #[test]
    fn test_color_mode_from_str() {
        assert_eq!("auto".parse::<ColorMode>().unwrap(), ColorMode::Auto);
        assert_eq!("always".parse::<ColorMode>().unwrap(), ColorMode::Always);
        assert_eq!("never".parse::<ColorMode>().unwrap(), ColorMode::Never);
        assert!("sometimes".parse::<ColorMode>().is_err());
    }
}
