//! Commands that produce printer bytes.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use recu_printer::{
    PrintRequest, PrinterWidth, build_test_page, preview_text, resolve_encoding, resolve_width,
};

use super::{Context, write_output};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Print request JSON file
    pub request: PathBuf,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print a plain-text preview instead of the bytes
    #[arg(long)]
    pub preview: bool,
}

#[derive(Args, Debug)]
pub struct TestPageArgs {
    /// Printer name (default: configured printer)
    pub printer: Option<String>,

    /// Paper width, detected from the name when omitted
    #[arg(long)]
    pub width: Option<PrinterWidth>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print a plain-text preview instead of the bytes
    #[arg(long)]
    pub preview: bool,
}

pub fn render(ctx: &Context, args: RenderArgs) -> Result<()> {
    let payload = fs::read_to_string(&args.request)
        .with_context(|| format!("reading {}", args.request.display()))?;
    let mut request = PrintRequest::from_json(&payload)
        .with_context(|| format!("parsing {}", args.request.display()))?;
    request.printer_name = ctx.printer_name(request.printer_name.take());

    let policy = ctx.policy.current();
    let job = recu_printer::render_request(&request, &policy, ctx.settings.default_printer_width)
        .context("rendering print request")?;

    emit(&job.bytes, args.output, args.preview)
}

pub fn test_page(ctx: &Context, args: TestPageArgs) -> Result<()> {
    let printer = ctx.printer_name(args.printer).unwrap_or_default();
    let width = args.width.unwrap_or_else(|| {
        if printer.trim().is_empty() {
            ctx.settings.default_printer_width
        } else {
            resolve_width(&printer)
        }
    });
    let decision = resolve_encoding(&printer, &ctx.policy.current(), None);
    let timestamp = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();

    let bytes = build_test_page(&printer, width, decision.encoding, &timestamp);
    emit(&bytes, args.output, args.preview)
}

fn emit(bytes: &[u8], output: Option<PathBuf>, preview: bool) -> Result<()> {
    if preview {
        print!("{}", preview_text(bytes));
        return Ok(());
    }
    write_output(bytes, output.as_deref())
}
