//! Value formatting and flag description seams.
//!
//! Both are consumed contracts of the renderer: the formatter turns raw
//! value bytes into an already-styled representation plus the logical
//! uncompressed size, and the flag decoder turns a bit-flag field into
//! human-readable descriptions. Default implementations are provided; the
//! renderer only sees the traits.

use crate::color::ColorScheme;
use crate::styled::StyledText;
use crate::util::backslashify;

/// A formatted value representation plus its logical uncompressed size.
#[derive(Debug)]
pub struct FormattedValue {
    /// Styled rendering of the payload; internal styling is preserved
    /// verbatim when spliced into the message block.
    pub styled: StyledText,
    /// Logical size before compression; equals the raw length when no
    /// decompression was applied.
    pub uncompressed_size: usize,
}

/// Formats raw value bytes for display. Must not mutate its inputs.
pub trait ValueFormatter {
    fn format(&self, bytes: &[u8], flags: u64, scheme: &ColorScheme) -> FormattedValue;
}

/// Default formatter: backslash-escaped single-line rendering, no
/// decompression.
#[derive(Debug, Default)]
pub struct EscapingFormatter;

impl ValueFormatter for EscapingFormatter {
    fn format(&self, bytes: &[u8], _flags: u64, scheme: &ColorScheme) -> FormattedValue {
        let mut styled = StyledText::new();
        styled.append_with(&backslashify(bytes), scheme.attr_value);
        FormattedValue {
            styled,
            uncompressed_size: bytes.len(),
        }
    }
}

/// Yields human-readable descriptions for a bit-flag field.
///
/// An empty list means "no description available", which is distinct from
/// the flags being zero.
pub trait FlagDecoder {
    fn describe(&self, flags: u64) -> Vec<String>;
}

/// Memcache flag-bit vocabulary.
const FLAG_NAMES: &[(u64, &str)] = &[
    (0x1, "PHP_SERIALIZED"),
    (0x2, "COMPRESSED"),
    (0x4, "FB_SERIALIZED"),
    (0x800, "NZLIB_COMPRESSED"),
    (0x2000, "QUICKLZ_COMPRESSED"),
    (0x4000, "SNAPPY_COMPRESSED"),
    (0x8000, "BIG_VALUE"),
    (0x10000, "NEGATIVE_CACHE"),
];

/// Default decoder over the memcache flag bits.
#[derive(Debug, Default)]
pub struct McFlagDecoder;

impl FlagDecoder for McFlagDecoder {
    fn describe(&self, flags: u64) -> Vec<String> {
        FLAG_NAMES
            .iter()
            .filter(|(bit, _)| flags & bit != 0)
            .map(|(_, name)| (*name).to_string())
            .collect()
    }
}
