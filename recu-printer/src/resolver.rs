//! Per-job decisions: paper width, target encoding, code page command
//!
//! The encoding policy is an immutable value built once from settings.
//! `PolicyStore` lets the outer layer swap in a new policy without any
//! reader ever seeing a half-updated one.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::encoding::Encoding;

// ============================================================================
// Paper width
// ============================================================================

/// Physical paper width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrinterWidth {
    #[default]
    #[serde(rename = "58mm")]
    Mm58,
    #[serde(rename = "80mm")]
    Mm80,
}

impl PrinterWidth {
    pub fn as_str(self) -> &'static str {
        match self {
            PrinterWidth::Mm58 => "58mm",
            PrinterWidth::Mm80 => "80mm",
        }
    }
}

impl fmt::Display for PrinterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "58mm" | "58" => Ok(PrinterWidth::Mm58),
            "80mm" | "80" => Ok(PrinterWidth::Mm80),
            other => Err(format!("Unknown printer width: {}", other)),
        }
    }
}

/// Tokens that identify an 80mm printer (checked first)
const WIDE_KEYWORDS: &[&str] = &[
    "80mm", "80 mm", "pos80", "tm-t88", "tmt88", "tm88", "t88", "tm-t20", "tmt20", "t20",
    "3inch", "3 inch", "80", "large", "wide",
];

/// Tokens that identify a 58mm printer
const NARROW_KEYWORDS: &[&str] = &[
    "58mm", "58 mm", "pos58", "tm-t20mini", "tmt20mini", "2inch", "2 inch", "58", "mini",
    "compact", "narrow",
];

/// Guess the paper width from a printer name (plus driver/port strings if known)
///
/// Defaults to 58mm when nothing matches.
#[instrument]
pub fn resolve_width(identity: &str) -> PrinterWidth {
    let haystack = identity.to_lowercase();

    if let Some(kw) = WIDE_KEYWORDS.iter().find(|kw| haystack.contains(*kw)) {
        debug!(keyword = kw, "detected 80mm printer");
        return PrinterWidth::Mm80;
    }
    if let Some(kw) = NARROW_KEYWORDS.iter().find(|kw| haystack.contains(*kw)) {
        debug!(keyword = kw, "detected 58mm printer");
        return PrinterWidth::Mm58;
    }

    debug!("width not detected, defaulting to 58mm");
    PrinterWidth::Mm58
}

// ============================================================================
// Encoding policy
// ============================================================================

/// Process-wide encoding policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPolicy {
    /// Every device gets ASCII, whatever its identity
    pub force_ascii: bool,
    /// Encoding for devices matching `narrow_patterns`
    pub narrow_encoding: Encoding,
    /// Encoding for every other device
    pub standard_encoding: Encoding,
    /// Whether a per-request encoding may override the automatic choice
    pub allow_override: bool,
    /// Case-insensitive name tokens of narrow-format devices
    pub narrow_patterns: Vec<String>,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            force_ascii: true,
            narrow_encoding: Encoding::Ascii,
            standard_encoding: Encoding::Cp1252,
            allow_override: true,
            narrow_patterns: vec!["POS-58".to_string(), "POS58".to_string()],
        }
    }
}

impl EncodingPolicy {
    /// Whether the device name looks like a narrow-format printer
    pub fn is_narrow_device(&self, identity: &str) -> bool {
        let upper = identity.to_uppercase();
        self.narrow_patterns
            .iter()
            .any(|p| upper.contains(&p.to_uppercase()))
    }
}

/// Atomically swappable holder for the active policy
#[derive(Debug, Default)]
pub struct PolicyStore {
    current: RwLock<Arc<EncodingPolicy>>,
}

impl PolicyStore {
    pub fn new(policy: EncodingPolicy) -> Self {
        Self {
            current: RwLock::new(Arc::new(policy)),
        }
    }

    /// Snapshot of the active policy
    pub fn current(&self) -> Arc<EncodingPolicy> {
        Arc::clone(&self.current.read())
    }

    /// Replace the active policy, returning the previous one
    pub fn replace(&self, policy: EncodingPolicy) -> Arc<EncodingPolicy> {
        std::mem::replace(&mut *self.current.write(), Arc::new(policy))
    }
}

/// Why an encoding was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    RequestOverride,
    ForcedAscii,
    NarrowDevice,
    StandardDevice,
}

impl DecisionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionSource::RequestOverride => "request_override",
            DecisionSource::ForcedAscii => "forced_ascii",
            DecisionSource::NarrowDevice => "narrow_device",
            DecisionSource::StandardDevice => "standard_device",
        }
    }
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding chosen for one print job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingDecision {
    pub encoding: Encoding,
    pub source: DecisionSource,
    pub printer_identity: String,
}

/// Choose the target encoding for a device
///
/// Order: explicit request (if allowed), forced ASCII, narrow device
/// pattern, standard device.
#[instrument(skip(policy))]
pub fn resolve_encoding(
    identity: &str,
    policy: &EncodingPolicy,
    requested: Option<Encoding>,
) -> EncodingDecision {
    let decide = |encoding, source| EncodingDecision {
        encoding,
        source,
        printer_identity: identity.to_string(),
    };

    if let Some(encoding) = requested {
        if policy.allow_override {
            return decide(encoding, DecisionSource::RequestOverride);
        }
        warn!(requested = %encoding, "encoding override disabled, ignoring request");
    }

    if policy.force_ascii {
        return decide(Encoding::Ascii, DecisionSource::ForcedAscii);
    }

    if policy.is_narrow_device(identity) {
        return decide(policy.narrow_encoding, DecisionSource::NarrowDevice);
    }

    decide(policy.standard_encoding, DecisionSource::StandardDevice)
}

// ============================================================================
// Code page select
// ============================================================================

/// ESC t n for each supported code page name
const CODEPAGE_COMMANDS: [(&str, [u8; 3]); 6] = [
    ("ascii", [0x1B, 0x74, 0]),
    ("cp437", [0x1B, 0x74, 0]),
    ("cp850", [0x1B, 0x74, 2]),
    ("cp858", [0x1B, 0x74, 19]),
    ("cp1252", [0x1B, 0x74, 16]),
    ("latin1", [0x1B, 0x74, 16]),
];

/// WPC1252, used for unknown names
pub const DEFAULT_CODEPAGE_COMMAND: [u8; 3] = [0x1B, 0x74, 16];

/// Printer command that switches the active code page
pub fn codepage_command(name: &str) -> [u8; 3] {
    let canonical = name
        .parse::<Encoding>()
        .map(|e| e.name().to_string())
        .unwrap_or_else(|_| name.trim().to_ascii_lowercase());

    match CODEPAGE_COMMANDS.iter().find(|(n, _)| *n == canonical) {
        Some((_, cmd)) => *cmd,
        None => {
            warn!(name = name, "unknown code page, using cp1252");
            DEFAULT_CODEPAGE_COMMAND
        }
    }
}

impl Encoding {
    /// Code page command matching this encoding
    pub fn codepage_command(self) -> [u8; 3] {
        codepage_command(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_width() {
        assert_eq!(resolve_width("EPSON TM-T88V"), PrinterWidth::Mm80);
        assert_eq!(resolve_width("POS-58 Printer"), PrinterWidth::Mm58);
        assert_eq!(resolve_width("Unknown Model"), PrinterWidth::Mm58);
        assert_eq!(resolve_width("XP-80 Receipt pos80"), PrinterWidth::Mm80);
        assert_eq!(resolve_width("Generic mini thermal"), PrinterWidth::Mm58);
    }

    #[test]
    fn test_default_policy_forces_ascii() {
        let policy = EncodingPolicy::default();
        let d = resolve_encoding("EPSON TM-T88V", &policy, None);
        assert_eq!(d.encoding, Encoding::Ascii);
        assert_eq!(d.source, DecisionSource::ForcedAscii);
    }

    #[test]
    fn test_device_patterns() {
        let policy = EncodingPolicy {
            force_ascii: false,
            ..Default::default()
        };
        let narrow = resolve_encoding("pos58 usb", &policy, None);
        assert_eq!(narrow.encoding, Encoding::Ascii);
        assert_eq!(narrow.source, DecisionSource::NarrowDevice);

        let standard = resolve_encoding("EPSON TM-T88V", &policy, None);
        assert_eq!(standard.encoding, Encoding::Cp1252);
        assert_eq!(standard.source, DecisionSource::StandardDevice);
    }

    #[test]
    fn test_request_override() {
        let policy = EncodingPolicy::default();
        let d = resolve_encoding("POS-58", &policy, Some(Encoding::Cp850));
        assert_eq!(d.encoding, Encoding::Cp850);
        assert_eq!(d.source, DecisionSource::RequestOverride);

        let locked = EncodingPolicy {
            allow_override: false,
            ..Default::default()
        };
        let d = resolve_encoding("POS-58", &locked, Some(Encoding::Cp850));
        assert_eq!(d.encoding, Encoding::Ascii);
    }

    #[test]
    fn test_policy_store_swap() {
        let store = PolicyStore::new(EncodingPolicy::default());
        let before = store.current();
        let old = store.replace(EncodingPolicy {
            force_ascii: false,
            ..Default::default()
        });
        assert!(old.force_ascii);
        assert!(before.force_ascii);
        assert!(!store.current().force_ascii);
    }

    #[test]
    fn test_codepage_command() {
        assert_eq!(codepage_command("cp850"), [0x1B, 0x74, 2]);
        assert_eq!(codepage_command("CP858"), [0x1B, 0x74, 19]);
        assert_eq!(codepage_command("windows-1252"), [0x1B, 0x74, 16]);
        assert_eq!(codepage_command("ascii"), [0x1B, 0x74, 0]);
        assert_eq!(codepage_command("klingon"), DEFAULT_CODEPAGE_COMMAND);
        assert_eq!(Encoding::Cp437.codepage_command(), [0x1B, 0x74, 0]);
    }
}
