//! Invisible-channel codec.
//!
//! Packs a [`SessionMarker`] into a run of zero-width Unicode code points
//! that can ride inside arbitrary reply text without changing its visible
//! rendering.
//!
//! ## Frame layout
//!
//! ```text
//! START_SENTINEL · body · END_SENTINEL
//! ```
//!
//! The alphabet is exactly four invisible code points, each carrying a fixed
//! 2-bit value. The body is the UTF-8 byte sequence of the payload
//! `"{session_id}|{turn_count}"`, one byte per four symbols, most
//! significant bits first. Sentinels are fixed six-symbol sequences drawn
//! from the same alphabet.
//!
//! Decoding is deliberately forgiving: characters outside the alphabet are
//! skipped wherever they appear (text transports insert spaces, joiners get
//! normalized), a trailing symbol group shorter than four is discarded, and
//! every failure mode resolves to `None` rather than an error.

use crate::marker::SessionMarker;

/// The invisible alphabet, indexed by 2-bit symbol value.
///
/// U+200B zero width space, U+200C zero width non-joiner,
/// U+200D zero width joiner, U+2060 word joiner.
const SYMBOLS: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}'];

/// Frame sentinels as symbol values: END is START reversed. Neither has a
/// short self-overlap, so payload runs cannot shift a sentinel match by a
/// symbol or two.
const START_PATTERN: [u8; 6] = [3, 0, 2, 0, 1, 3];
const END_PATTERN: [u8; 6] = [3, 1, 0, 2, 0, 3];

/// Encode a marker as an invisible text fragment.
pub fn encode(marker: &SessionMarker) -> String {
    let payload = marker.to_payload();
    // Every symbol is a 3-byte code point: 4 per payload byte + 2 sentinels.
    let mut out = String::with_capacity((payload.len() * 4 + 12) * 3);

    for value in START_PATTERN {
        out.push(SYMBOLS[value as usize]);
    }
    for byte in payload.bytes() {
        out.push(SYMBOLS[usize::from(byte >> 6)]);
        out.push(SYMBOLS[usize::from((byte >> 4) & 0b11)]);
        out.push(SYMBOLS[usize::from((byte >> 2) & 0b11)]);
        out.push(SYMBOLS[usize::from(byte & 0b11)]);
    }
    for value in END_PATTERN {
        out.push(SYMBOLS[value as usize]);
    }

    out
}

/// Decode the first complete frame found in `text`.
///
/// Returns `None` when no START/END pair exists, when the enclosed bytes are
/// not valid UTF-8, or when the payload lacks a usable id/count pair.
pub fn decode(text: &str) -> Option<SessionMarker> {
    let symbols: Vec<u8> = text.chars().filter_map(symbol_value).collect();

    let start = find_pattern(&symbols, &START_PATTERN, 0)?;
    let body_from = start + START_PATTERN.len();
    let end = find_pattern(&symbols, &END_PATTERN, body_from)?;

    let mut bytes = Vec::with_capacity((end - body_from) / 4);
    for group in symbols[body_from..end].chunks_exact(4) {
        bytes.push(group[0] << 6 | group[1] << 4 | group[2] << 2 | group[3]);
    }

    let payload = String::from_utf8(bytes).ok()?;
    SessionMarker::from_payload(&payload)
}

/// True when `text` contains at least one character of the alphabet.
pub fn carries_symbols(text: &str) -> bool {
    text.chars().any(|c| symbol_value(c).is_some())
}

fn symbol_value(c: char) -> Option<u8> {
    SYMBOLS.iter().position(|&s| s == c).map(|v| v as u8)
}

fn find_pattern(symbols: &[u8], pattern: &[u8; 6], from: usize) -> Option<usize> {
    symbols
        .get(from..)?
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|i| from + i)
}
