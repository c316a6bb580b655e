//! # recu-printer
//!
//! Receipt printing core for ESC/POS thermal printers - pure, no I/O.
//!
//! ## Scope
//!
//! This crate turns receipts into printer bytes:
//! - Transliteration of French text to readable ASCII
//! - Safe encoding to single-byte code pages (never fails)
//! - Per-device width and encoding resolution
//! - ESC/POS command building
//! - Receipt layouts (standard, hotel, mixed), raw text jobs, test page
//!
//! Delivering the bytes to a device stays in application code.
//!
//! ## Example
//!
//! ```ignore
//! use recu_printer::{
//!     EncodingPolicy, LayoutParams, ReceiptDocument, ReceiptType, build_document,
//!     resolve_encoding, resolve_width,
//! };
//!
//! let receipt = ReceiptDocument::from_json(payload)?;
//! let width = resolve_width("EPSON TM-T88V");
//! let decision = resolve_encoding("EPSON TM-T88V", &EncodingPolicy::default(), None);
//!
//! let bytes = build_document(
//!     &receipt,
//!     ReceiptType::Standard,
//!     LayoutParams::for_width(width),
//!     decision.encoding,
//! )?;
//! ```

mod codepage;
mod encoding;
mod error;
mod escpos;
mod layout;
mod receipt;
mod resolver;
mod transliterate;

// Re-exports
pub use encoding::{
    EncodeOutcome, Encoding, FALLBACK_ORDER, UnknownEncoding, encode, encode_ascii_readable,
    encode_first, fallback_chain,
};
pub use error::{FormatResult, FormattingError, PrintError, PrintResult};
pub use escpos::{CUT, EscPosBuilder, INIT, preview_text};
pub use layout::{
    CURRENCY, LayoutParams, format_fixed, format_grouped, text_width, to_decimal,
    truncate_ellipsis,
};
pub use receipt::*;
pub use resolver::{
    DEFAULT_CODEPAGE_COMMAND, DecisionSource, EncodingDecision, EncodingPolicy, PolicyStore,
    PrinterWidth, codepage_command, resolve_encoding, resolve_width,
};
pub use transliterate::transliterate;
