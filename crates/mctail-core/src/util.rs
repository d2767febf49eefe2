//! Small text helpers shared across rendering.

use std::fmt::Write as _;

/// Escapes bytes for single-line display.
///
/// Printable ASCII passes through; backslash and common control characters
/// get their two-character escapes; everything else becomes `\xNN`.
pub fn backslashify(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out
}
