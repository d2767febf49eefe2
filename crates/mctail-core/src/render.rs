//! Deterministic text layout of one decoded message.
//!
//! One event in, at most one styled block out. The end-of-stream lifecycle
//! marker renders nothing; every other event renders a `{ ... }` block with
//! an optional header line, the attribute lines, and an optional value
//! section. Missing optional fields are omitted, never errors.

use crate::color::ColorScheme;
use crate::event::MessageEvent;
use crate::styled::StyledText;
use crate::util::backslashify;
use crate::value::{FlagDecoder, ValueFormatter};

/// Read-only render-time context, constructed once at startup.
pub struct RenderContext<'a> {
    pub scheme: &'a ColorScheme,
    /// Suppresses the `value:` line only; `value size:` still renders.
    pub quiet: bool,
    pub formatter: &'a dyn ValueFormatter,
    pub flags: &'a dyn FlagDecoder,
}

/// Up to three space-separated tokens: operation, result, escaped key.
/// Empty when all three are absent.
fn header_text(event: &MessageEvent) -> String {
    let mut out = String::new();
    if let Some(op) = event.op {
        out.push_str(op.wire_name());
    }
    if let Some(reply) = event.reply {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(reply.wire_name());
    }
    if let Some(key) = &event.key
        && !key.is_empty()
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&backslashify(key));
    }
    out
}

/// Renders one message event, or `None` for the end-of-stream marker.
pub fn render(event: &MessageEvent, ctx: &RenderContext<'_>) -> Option<StyledText> {
    if event.is_end_marker() {
        return None;
    }
    let scheme = ctx.scheme;
    let mut out = StyledText::new();

    out.append_with("{\n", scheme.delimiter);

    let header = header_text(event);
    if !header.is_empty() {
        out.append("  ");
        out.append_with(&header, scheme.header);
        out.push_char('\n');
    }

    out.append_with("  reqid: ", scheme.attr_label);
    out.append_with(&format!("0x{:x}", event.reqid), scheme.attr_value);
    out.push_char('\n');

    out.append_with("  flags: ", scheme.attr_label);
    out.append_with(&format!("0x{:x}", event.flags), scheme.attr_value);
    if event.flags != 0 {
        let descriptions = ctx.flags.describe(event.flags);
        if !descriptions.is_empty() {
            out.push_color(scheme.decoration);
            out.append(" [");
            for (i, description) in descriptions.iter().enumerate() {
                if i > 0 {
                    out.append(", ");
                }
                out.append(description);
            }
            out.push_char(']');
            out.pop_color();
        }
    }
    out.push_char('\n');

    if event.exptime != 0 {
        out.append_with("  exptime: ", scheme.attr_label);
        out.append_with(&event.exptime.to_string(), scheme.attr_value);
        out.push_char('\n');
    }

    if let Some(value) = &event.value
        && !value.is_empty()
    {
        let formatted = ctx.formatter.format(value, event.flags, scheme);

        out.append_with("  value size: ", scheme.attr_label);
        if formatted.uncompressed_size != value.len() {
            let savings = 100.0 - 100.0 * value.len() as f64 / formatted.uncompressed_size as f64;
            out.append_with(
                &format!(
                    "{} uncompressed, {} compressed, {savings:.2}% savings",
                    formatted.uncompressed_size,
                    value.len(),
                ),
                scheme.attr_value,
            );
        } else {
            out.append_with(&value.len().to_string(), scheme.attr_value);
        }

        if !ctx.quiet {
            out.append_with("\n  value: ", scheme.attr_label);
            out.extend(formatted.styled);
        }
        out.push_char('\n');
    }

    out.append_with("}\n", scheme.delimiter);
    Some(out)
}
