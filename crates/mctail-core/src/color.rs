//! Display colors and the semantic color scheme.
//!
//! Colors here are UI-agnostic; they are translated to actual terminal
//! styling only at the output boundary (see [`crate::sink`]). This keeps
//! the rendering pipeline free of terminal dependencies.

/// A display color attached to a run of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// The destination's default foreground.
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGray,
}

/// Maps semantic roles in a rendered message to display colors.
///
/// Resolved once at startup and shared read-only by every render.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Block delimiters (`{` / `}` lines).
    pub delimiter: Color,
    /// The operation/result/key header line.
    pub header: Color,
    /// Attribute labels (`reqid:`, `flags:`, `exptime:`, `value size:`, `value:`).
    pub attr_label: Color,
    /// Attribute values (hex ids, sizes, the value text).
    pub attr_value: Color,
    /// Decorative brackets around flag descriptions.
    pub decoration: Color,
    /// Pattern match highlight.
    pub matched: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            delimiter: Color::Blue,
            header: Color::Green,
            attr_label: Color::Cyan,
            attr_value: Color::White,
            decoration: Color::DarkGray,
            matched: Color::Red,
        }
    }
}
