//! Text-file encoding detection and conversion.
//!
//! A BOM always wins.  Without one, the caller decides whether the
//! first-two-octet heuristic applies (`x,0` → UTF-16LE, `0,x` → UTF-16BE,
//! anything else UTF-8); with the heuristic off, BOM-less files are the
//! engine's native Windows-1252.

use encoding_rs::WINDOWS_1252;

use crate::error::{FormatError, Result};

/// Detected or chosen text encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Windows1252,
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Detect the encoding and decode the whole file to a string.
///
/// `utf_detect` enables the BOM-less first-two-octet heuristic.
pub fn decode_text(bytes: &[u8], utf_detect: bool) -> Result<(Encoding, String)> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return Ok((Encoding::Utf8, decode_utf8(rest)?));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return Ok((Encoding::Utf16Le, decode_utf16(rest, false)?));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return Ok((Encoding::Utf16Be, decode_utf16(rest, true)?));
    }
    if utf_detect {
        let enc = match (bytes.first(), bytes.get(1)) {
            (Some(&a), Some(&b)) if a != 0 && b == 0 => Encoding::Utf16Le,
            (Some(&a), Some(&b)) if a == 0 && b != 0 => Encoding::Utf16Be,
            _ => Encoding::Utf8,
        };
        let text = match enc {
            Encoding::Utf16Le => decode_utf16(bytes, false)?,
            Encoding::Utf16Be => decode_utf16(bytes, true)?,
            _ => decode_utf8(bytes)?,
        };
        return Ok((enc, text));
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    Ok((Encoding::Windows1252, text.into_owned()))
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| FormatError::InvalidUtf8.into())
}

fn decode_utf16(bytes: &[u8], big: bool) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(FormatError::InvalidUtf8.into());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| {
            if big {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| FormatError::UnpairedSurrogate.into())
}

/// Encode to Windows-1252; `None` when a character has no mapping.
pub fn encode_w1252(text: &str) -> Option<Vec<u8>> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        None
    } else {
        Some(bytes.into_owned())
    }
}

/// Decode Windows-1252 bytes (total: every byte maps).
pub fn decode_w1252(bytes: &[u8]) -> String {
    WINDOWS_1252.decode(bytes).0.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_wins_over_heuristics() {
        let (enc, text) = decode_text(b"\xEF\xBB\xBFabc", false).unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, "abc");

        let (enc, text) = decode_text(b"\xFF\xFEa\x00b\x00", false).unwrap();
        assert_eq!(enc, Encoding::Utf16Le);
        assert_eq!(text, "ab");

        let (enc, text) = decode_text(b"\xFE\xFF\x00a\x00b", false).unwrap();
        assert_eq!(enc, Encoding::Utf16Be);
        assert_eq!(text, "ab");
    }

    #[test]
    fn heuristic_detects_bomless_utf16() {
        let (enc, text) = decode_text(b"a\x00b\x00", true).unwrap();
        assert_eq!(enc, Encoding::Utf16Le);
        assert_eq!(text, "ab");

        let (enc, text) = decode_text(b"\x00a\x00b", true).unwrap();
        assert_eq!(enc, Encoding::Utf16Be);
        assert_eq!(text, "ab");

        let (enc, text) = decode_text("höhe".as_bytes(), true).unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, "höhe");
    }

    #[test]
    fn heuristic_off_means_windows_1252() {
        // 0xE4 is ä in Windows-1252 and invalid alone in UTF-8.
        let (enc, text) = decode_text(b"h\xE4he", false).unwrap();
        assert_eq!(enc, Encoding::Windows1252);
        assert_eq!(text, "hähe");
    }

    #[test]
    fn invalid_utf8_is_rejected_not_replaced() {
        assert!(decode_text(b"ab\xE4cd", true).is_err());
    }

    #[test]
    fn lone_surrogate_is_rejected() {
        // 0xD800 unpaired, UTF-16LE with BOM.
        assert!(decode_text(b"\xFF\xFE\x00\xD8", false).is_err());
        // Odd byte count cannot be UTF-16.
        assert!(decode_text(b"\xFF\xFEa", false).is_err());
    }

    #[test]
    fn w1252_round_trip() {
        let bytes = encode_w1252("Straße").unwrap();
        assert_eq!(bytes, b"Stra\xDFe");
        assert_eq!(decode_w1252(&bytes), "Straße");
        assert_eq!(encode_w1252("日本語"), None);
    }
}
