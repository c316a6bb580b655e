//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data. Text is encoded
//! for the target code page as it is written, so control sequences and
//! text bytes never mix before encoding.

use crate::encoding::{Encoding, encode};

/// ESC @ - Initialize printer
pub const INIT: [u8; 2] = [0x1B, 0x40];

/// GS V 0 - Full cut
pub const CUT: [u8; 3] = [0x1D, 0x56, 0x00];

/// ESC/POS command builder
///
/// Starts every buffer with the initialize command followed by the code
/// page select for the builder's encoding.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    encoding: Encoding,
}

impl EscPosBuilder {
    /// Create a new builder with the paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize, encoding: Encoding) -> Self {
        let mut buf = Vec::with_capacity(2048);
        buf.extend_from_slice(&INIT);
        buf.extend_from_slice(&encoding.codepage_command());
        Self {
            buf,
            width,
            encoding,
        }
    }

    // === Text Output ===

    /// Write text encoded for the target code page
    pub fn text(&mut self, s: &str) -> &mut Self {
        let bytes = encode(s, self.encoding);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write text followed by CR LF
    pub fn line_crlf(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Write multiple empty lines
    pub fn newlines(&mut self, count: usize) -> &mut Self {
        self.buf.extend(std::iter::repeat_n(b'\n', count));
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Print a bold line, then restore normal weight
    pub fn bold_line(&mut self, s: &str) -> &mut Self {
        self.bold();
        self.line(s);
        self.bold_off()
    }

    /// Print a centered line, then restore left alignment
    pub fn center_line(&mut self, s: &str) -> &mut Self {
        self.center();
        self.line(s);
        self.left()
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&CUT);
        self
    }

    // === Build ===

    /// Finish and return the byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Plain-text view of a print buffer
///
/// Command sequences are dropped, bytes outside printable ASCII show as '?'.
pub fn preview_text(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            // ESC @ is the only two-byte command we emit
            0x1B if data.get(i + 1) == Some(&0x40) => i += 2,
            0x1B | 0x1D => i += 3,
            b'\r' => i += 1,
            b => {
                if b == b'\n' || b == b' ' || b.is_ascii_graphic() {
                    out.push(b as char);
                } else {
                    out.push('?');
                }
                i += 1;
            }
        }
    }
    out
}
