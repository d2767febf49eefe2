//! The five-stage pipeline behind a single `accept one event` seam.
//!
//! decoded event -> renderer -> styled block -> (optional) highlighter ->
//! output sink. One event in, at most one flushed block out; no queuing, no
//! reordering. All shared state is fixed at construction.

use std::io::Write;

use anyhow::{Context, Result};

use crate::color::ColorScheme;
use crate::event::{MessageEvent, TraceSink};
use crate::highlight::filter_highlight;
use crate::pattern::Pattern;
use crate::render::{RenderContext, render};
use crate::sink::OutputSink;
use crate::value::{EscapingFormatter, FlagDecoder, McFlagDecoder, ValueFormatter};

/// Renders, filters and emits decoded events.
pub struct Pipeline<W: Write> {
    scheme: ColorScheme,
    quiet: bool,
    formatter: Box<dyn ValueFormatter>,
    flags: Box<dyn FlagDecoder>,
    pattern: Option<Pattern>,
    sink: OutputSink<W>,
}

impl<W: Write> Pipeline<W> {
    /// Pipeline with the default scheme, formatter and flag decoder.
    pub fn new(sink: OutputSink<W>, pattern: Option<Pattern>, quiet: bool) -> Self {
        Self {
            scheme: ColorScheme::default(),
            quiet,
            formatter: Box::new(EscapingFormatter),
            flags: Box::new(McFlagDecoder),
            pattern,
            sink,
        }
    }

    /// Replaces the value formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn ValueFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replaces the flag decoder.
    pub fn with_flag_decoder(mut self, flags: Box<dyn FlagDecoder>) -> Self {
        self.flags = flags;
        self
    }
}

impl<W: Write> TraceSink for Pipeline<W> {
    fn accept(&mut self, event: &MessageEvent) -> Result<()> {
        let ctx = RenderContext {
            scheme: &self.scheme,
            quiet: self.quiet,
            formatter: self.formatter.as_ref(),
            flags: self.flags.as_ref(),
        };
        let Some(mut block) = render(event, &ctx) else {
            return Ok(());
        };
        if let Some(pattern) = &self.pattern
            && !filter_highlight(&mut block, pattern, self.scheme.matched)
        {
            return Ok(());
        }
        self.sink
            .write_block(block)
            .context("write rendered message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Op;

    fn event(key: &str) -> MessageEvent {
        MessageEvent {
            op: Some(Op::Set),
            key: Some(key.as_bytes().to_vec()),
            ..Default::default()
        }
    }

    fn pipeline<'a>(pattern: Option<&str>, buf: &'a mut Vec<u8>) -> Pipeline<&'a mut Vec<u8>> {
        let pattern = pattern.map(|p| Pattern::compile(p).unwrap().unwrap());
        Pipeline::new(OutputSink::new(buf, false), pattern, false)
    }

    /// No pattern: every rendered block reaches the sink.
    #[test]
    fn test_no_pattern_passes_all() {
        let mut buf = Vec::new();
        let mut p = pipeline(None, &mut buf);
        p.accept(&event("a")).unwrap();
        p.accept(&event("b")).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches("{\n").count(), 2);
    }

    /// Suppression law: zero matches means nothing is written.
    #[test]
    fn test_unmatched_message_suppressed() {
        let mut buf = Vec::new();
        let mut p = pipeline(Some("nomatch"), &mut buf);
        p.accept(&event("hello")).unwrap();
        drop(p);
        assert!(buf.is_empty());
    }

    /// Matched messages pass through with text unchanged.
    #[test]
    fn test_matched_message_emitted() {
        let mut buf = Vec::new();
        let mut p = pipeline(Some("hello"), &mut buf);
        p.accept(&event("hello")).unwrap();
        drop(p);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("set hello"), "got: {out}");
    }

    /// The pattern sees rendered text, so attribute labels match too.
    #[test]
    fn test_pattern_matches_rendered_attributes() {
        let mut buf = Vec::new();
        let mut p = pipeline(Some("reqid: 0x7"), &mut buf);
        p.accept(&MessageEvent {
            reqid: 7,
            ..Default::default()
        })
        .unwrap();
        drop(p);
        assert!(!buf.is_empty());
    }

    /// End markers never reach the sink, pattern or not.
    #[test]
    fn test_end_marker_emits_nothing() {
        let mut buf = Vec::new();
        let mut p = pipeline(None, &mut buf);
        p.accept(&MessageEvent {
            op: Some(Op::End),
            ..Default::default()
        })
        .unwrap();
        drop(p);
        assert!(buf.is_empty());
    }
}
