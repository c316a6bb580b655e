//! Print jobs other than receipts, and the request envelope tying a job to
//! a device

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::encoding::Encoding;
use crate::error::FormatResult;
use crate::escpos::EscPosBuilder;
use crate::layout::{LayoutParams, truncate_ellipsis};
use crate::resolver::{
    EncodingDecision, EncodingPolicy, PrinterWidth, resolve_encoding, resolve_width,
};

use super::model::{ReceiptDocument, ReceiptType};
use super::renderer::build_document;

/// Sample line printed on the test page
const FRENCH_SAMPLE: &str = "Accents: é è à ç ù ô œ €";

/// Plain text job: every input line encoded and printed as is
pub fn build_text_document(text: &str, encoding: Encoding) -> Vec<u8> {
    let mut b = EscPosBuilder::new(LayoutParams::default().max_width, encoding);
    for line in text.lines() {
        b.line(line);
    }
    b.newlines(3);
    b.cut();
    b.build()
}

/// Device check page
///
/// `timestamp` is printed verbatim; callers format their local time.
pub fn build_test_page(
    printer_name: &str,
    width: PrinterWidth,
    encoding: Encoding,
    timestamp: &str,
) -> Vec<u8> {
    let layout = LayoutParams::for_width(width);
    let mut b = EscPosBuilder::new(layout.max_width, encoding);
    let fit = |s: String| truncate_ellipsis(&s, layout.max_width);

    b.center();
    b.bold().double_height();
    b.line("TEST D'IMPRESSION");
    b.reset_size().bold_off();
    b.newline();

    b.line(&fit(format!("Imprimante: {}", printer_name)));
    b.line(&fit(format!("Type: {}", width)));
    b.line(&fit(format!("Encodage: {}", encoding)));
    b.line(&fit(format!("Date: {}", timestamp)));
    b.newline();

    b.left();
    b.line("Texte normal");
    b.bold_line("Texte en gras");
    b.double_height();
    b.line("Texte double hauteur");
    b.reset_size();
    b.line(&fit(FRENCH_SAMPLE.to_string()));
    b.sep_single();

    b.newline();
    b.center_line("*** FIN DU TEST ***");
    b.newlines(3);
    b.cut();
    b.build()
}

// ============================================================================
// Request envelope
// ============================================================================

/// What to print
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrintJob {
    Receipt {
        data: ReceiptDocument,
        #[serde(default)]
        receipt_type: Option<String>,
    },
    Raw {
        #[serde(default)]
        text: String,
    },
}

/// One print request: target device plus job
#[derive(Debug, Clone, Deserialize)]
pub struct PrintRequest {
    /// Device identity (name, optionally with driver/port strings)
    #[serde(default, alias = "printer_id")]
    pub printer_name: Option<String>,
    #[serde(default)]
    pub printer_width: Option<PrinterWidth>,
    /// Requested encoding name; unknown names are ignored
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(flatten)]
    pub job: PrintJob,
}

impl PrintRequest {
    /// Parse a request; a missing `type` means a receipt job
    pub fn from_json(payload: &str) -> FormatResult<Self> {
        let mut value: Value = serde_json::from_str(payload)?;
        if let Value::Object(map) = &mut value
            && !map.contains_key("type")
        {
            map.insert("type".to_string(), Value::String("receipt".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn requested_encoding(&self) -> Option<Encoding> {
        let name = self.encoding.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        name.parse()
            .inspect_err(|e| warn!(error = %e, "ignoring requested encoding"))
            .ok()
    }
}

/// Bytes produced for a request, with the decisions behind them
#[derive(Debug, Clone)]
pub struct RenderedJob {
    pub bytes: Vec<u8>,
    pub width: PrinterWidth,
    pub decision: EncodingDecision,
}

/// Resolve width and encoding for a request, then build its bytes
///
/// Width: explicit, else detected from the printer name, else
/// `default_width` when there is no name to detect from.
#[instrument(skip(request, policy), fields(printer = request.printer_name.as_deref().unwrap_or("")))]
pub fn render_request(
    request: &PrintRequest,
    policy: &EncodingPolicy,
    default_width: PrinterWidth,
) -> FormatResult<RenderedJob> {
    let identity = request.printer_name.as_deref().unwrap_or("").trim();

    let width = match request.printer_width {
        Some(width) => width,
        None if !identity.is_empty() => resolve_width(identity),
        None => default_width,
    };
    let decision = resolve_encoding(identity, policy, request.requested_encoding());
    let layout = LayoutParams::for_width(width);

    let bytes = match &request.job {
        PrintJob::Receipt { data, receipt_type } => {
            let receipt_type = receipt_type
                .as_deref()
                .map(ReceiptType::parse_lenient)
                .unwrap_or_default();
            build_document(data, receipt_type, layout, decision.encoding)?
        }
        PrintJob::Raw { text } => build_text_document(text, decision.encoding),
    };

    info!(
        width = %width,
        encoding = %decision.encoding,
        bytes = bytes.len(),
        "print job rendered"
    );
    Ok(RenderedJob {
        bytes,
        width,
        decision,
    })
}
