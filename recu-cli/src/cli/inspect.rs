//! Commands that explain decisions without building a document.

use anyhow::{Context as _, Result};
use clap::Args;
use recu_printer::{Encoding, LayoutParams, encode as encode_text, resolve_encoding, resolve_width};

use super::Context;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Text to encode
    pub text: String,

    /// Target encoding (default: resolved for the printer)
    #[arg(long, short = 'e')]
    pub encoding: Option<String>,

    /// Printer used to resolve the encoding
    #[arg(long, short = 'p')]
    pub printer: Option<String>,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Printer identity: name, optionally with driver and port strings
    pub identity: Vec<String>,
}

pub fn encode(ctx: &Context, args: EncodeArgs) -> Result<()> {
    let encoding = match args.encoding.as_deref() {
        Some(name) => name
            .parse::<Encoding>()
            .with_context(|| format!("--encoding {}", name))?,
        None => {
            let printer = ctx.printer_name(args.printer).unwrap_or_default();
            resolve_encoding(&printer, &ctx.policy.current(), None).encoding
        }
    };

    let bytes = encode_text(&args.text, encoding);
    println!("{}: {}", encoding, hex::encode(&bytes));
    Ok(())
}

pub fn detect(ctx: &Context, args: DetectArgs) -> Result<()> {
    let identity = args.identity.join(" ");
    let width = resolve_width(&identity);
    let layout = LayoutParams::for_width(width);
    let decision = resolve_encoding(&identity, &ctx.policy.current(), None);

    println!("Printer:  {}", identity);
    println!("Width:    {} ({} columns)", width, layout.max_width);
    println!("Encoding: {} ({})", decision.encoding, decision.source);
    println!(
        "Codepage: {}",
        hex::encode(decision.encoding.codepage_command())
    );
    Ok(())
}
