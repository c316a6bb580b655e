//! Safe text encoding for thermal printers
//!
//! `encode` turns Unicode text into the bytes of a printer code page and
//! never fails:
//! - `ascii` targets go through transliteration, then lossy ASCII
//! - other targets try a strict encode with the requested code page, then
//!   with each fallback code page in priority order
//! - if nothing encodes strictly, the ASCII path is the terminal case

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::codepage::{
    CP437_HIGH, CP850_HIGH, encode_ascii, encode_ascii_lossy, encode_latin1, encode_oem,
    encode_windows_1252,
};
use crate::transliterate::transliterate;

/// Target byte encodings supported by the printers we drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Ascii,
    Cp1252,
    Cp850,
    Cp437,
    Latin1,
}

/// Default fallback order after the requested encoding
pub const FALLBACK_ORDER: [Encoding; 5] = [
    Encoding::Cp1252,
    Encoding::Cp850,
    Encoding::Latin1,
    Encoding::Cp437,
    Encoding::Ascii,
];

impl Encoding {
    pub const ALL: [Encoding; 5] = [
        Encoding::Ascii,
        Encoding::Cp1252,
        Encoding::Cp850,
        Encoding::Cp437,
        Encoding::Latin1,
    ];

    /// Canonical name, as used in configuration and the code page table
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Cp1252 => "cp1252",
            Encoding::Cp850 => "cp850",
            Encoding::Cp437 => "cp437",
            Encoding::Latin1 => "latin1",
        }
    }

    /// Strict encode: `None` if any character is not representable
    pub fn encode_strict(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Encoding::Ascii => encode_ascii(text),
            Encoding::Cp1252 => encode_windows_1252(text),
            Encoding::Cp850 => encode_oem(text, &CP850_HIGH),
            Encoding::Cp437 => encode_oem(text, &CP437_HIGH),
            Encoding::Latin1 => encode_latin1(text),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown encoding name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "cp1252" | "windows-1252" | "win1252" => Ok(Encoding::Cp1252),
            "cp850" | "ibm850" => Ok(Encoding::Cp850),
            "cp437" | "ibm437" => Ok(Encoding::Cp437),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            _ => Err(UnknownEncoding(s.to_string())),
        }
    }
}

/// Result of walking a list of encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    Encoded { encoding: Encoding, bytes: Vec<u8> },
    AllFailed,
}

/// Try each encoding strictly, returning the first success
pub fn encode_first(text: &str, order: &[Encoding]) -> EncodeOutcome {
    for &encoding in order {
        if let Some(bytes) = encoding.encode_strict(text) {
            return EncodeOutcome::Encoded { encoding, bytes };
        }
    }
    EncodeOutcome::AllFailed
}

/// Requested encoding first, then the fallback order without duplicates
pub fn fallback_chain(requested: Encoding) -> Vec<Encoding> {
    let mut chain = Vec::with_capacity(FALLBACK_ORDER.len() + 1);
    chain.push(requested);
    chain.extend(FALLBACK_ORDER.iter().copied().filter(|e| *e != requested));
    chain
}

/// Transliterate, then encode as ASCII replacing leftovers with `?`
///
/// Non-empty input never yields an empty buffer: text that transliterates
/// away entirely (a lone combining mark) prints as a single `?`.
pub fn encode_ascii_readable(text: &str) -> Vec<u8> {
    let bytes = encode_ascii_lossy(&transliterate(text));
    if bytes.is_empty() && !text.is_empty() {
        return vec![b'?'];
    }
    bytes
}

/// Encode text for the target printer encoding. Never fails.
#[instrument(level = "trace", skip(text), fields(len = text.len()))]
pub fn encode(text: &str, target: Encoding) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }

    if target == Encoding::Ascii {
        return encode_ascii_readable(text);
    }

    match encode_first(text, &fallback_chain(target)) {
        EncodeOutcome::Encoded { encoding, bytes } => {
            if encoding != target {
                warn!(
                    requested = %target,
                    used = %encoding,
                    text = text,
                    "encoding fell back"
                );
            }
            bytes
        }
        EncodeOutcome::AllFailed => {
            debug!(requested = %target, "no code page fits, using readable ASCII");
            encode_ascii_readable(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("ASCII".parse::<Encoding>(), Ok(Encoding::Ascii));
        assert_eq!("windows-1252".parse::<Encoding>(), Ok(Encoding::Cp1252));
        assert_eq!("ISO-8859-1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert_eq!(" cp850 ".parse::<Encoding>(), Ok(Encoding::Cp850));
        assert!("utf-8".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_fallback_chain_dedup() {
        assert_eq!(
            fallback_chain(Encoding::Cp850),
            vec![
                Encoding::Cp850,
                Encoding::Cp1252,
                Encoding::Latin1,
                Encoding::Cp437,
                Encoding::Ascii
            ]
        );
        assert_eq!(fallback_chain(Encoding::Cp1252).len(), 5);
    }

    #[test]
    fn test_encode_first() {
        assert_eq!(
            encode_first("½", &[Encoding::Ascii, Encoding::Cp437]),
            EncodeOutcome::Encoded {
                encoding: Encoding::Cp437,
                bytes: vec![0xAB]
            }
        );
        assert_eq!(
            encode_first("😀", &Encoding::ALL),
            EncodeOutcome::AllFailed
        );
    }

    #[test]
    fn test_encode_direct() {
        assert_eq!(encode("café", Encoding::Cp1252), b"caf\xE9".to_vec());
        assert_eq!(encode("café", Encoding::Cp850), b"caf\x82".to_vec());
        assert_eq!(encode("café", Encoding::Latin1), b"caf\xE9".to_vec());
    }

    #[test]
    fn test_encode_fallback() {
        // € is not in Latin-1, windows-1252 picks it up
        assert_eq!(encode("5€", Encoding::Latin1), b"5\x80".to_vec());
        // ≥ only exists in CP437
        assert_eq!(encode("≥", Encoding::Cp850), vec![0xF2]);
    }

    #[test]
    fn test_encode_ascii_path() {
        assert_eq!(encode("Crème brûlée", Encoding::Ascii), b"Creme brulee".to_vec());
        assert_eq!(encode("prix 😀", Encoding::Ascii), b"prix ?".to_vec());
    }

    #[test]
    fn test_encode_never_fails() {
        for enc in Encoding::ALL {
            assert!(encode("", enc).is_empty());
            let out = encode("😀中文\u{0007}", enc);
            assert!(!out.is_empty());
        }
        // Nothing fits strictly: ends on the ASCII path
        assert_eq!(encode("😀", Encoding::Cp1252), b"?".to_vec());
    }

    #[test]
    fn test_lone_combining_mark() {
        for enc in Encoding::ALL {
            assert_eq!(encode("\u{0301}", enc), b"?".to_vec(), "{}", enc);
        }
        assert_eq!(encode_ascii_readable("\u{0301}\u{0308}"), b"?".to_vec());
        assert_eq!(encode_ascii_readable("e\u{0301}"), b"e".to_vec());
    }
}
