//! Column layout helpers
//!
//! Widths are counted in characters: every code page we target is
//! single-byte, so one character prints as one column once encoded.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::resolver::PrinterWidth;

/// Character widths derived from the paper width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub printer_width: PrinterWidth,
    /// Characters per line
    pub max_width: usize,
    /// Article name column in item tables
    pub article_name_width: usize,
}

impl LayoutParams {
    pub const fn for_width(printer_width: PrinterWidth) -> Self {
        match printer_width {
            PrinterWidth::Mm58 => Self {
                printer_width,
                max_width: 32,
                article_name_width: 14,
            },
            PrinterWidth::Mm80 => Self {
                printer_width,
                max_width: 48,
                article_name_width: 24,
            },
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::for_width(PrinterWidth::default())
    }
}

impl From<PrinterWidth> for LayoutParams {
    fn from(width: PrinterWidth) -> Self {
        Self::for_width(width)
    }
}

/// Number of printed columns
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Cut to `limit` columns, ending with "..." when shortened
pub fn truncate_ellipsis(s: &str, limit: usize) -> String {
    if text_width(s) <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Fit into exactly `width` columns: shortened with a trailing '.', or
/// padded with spaces
pub fn fit_column(s: &str, width: usize) -> String {
    if text_width(s) > width {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('.');
        out
    } else {
        pad(s, width, false)
    }
}

/// Pad a string to a column width (never truncates)
pub fn pad(s: &str, width: usize, align_right: bool) -> String {
    let current = text_width(s);
    if current >= width {
        return s.to_string();
    }
    let spaces = " ".repeat(width - current);
    if align_right {
        format!("{}{}", spaces, s)
    } else {
        format!("{}{}", s, spaces)
    }
}

/// Greedy word wrap; words longer than the width are split hard
pub fn wrap_words(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in s.split_whitespace() {
        let mut word: String = word.to_string();

        while text_width(&word) > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }

        if current.is_empty() {
            current = word;
        } else if text_width(&current) + 1 + text_width(&word) <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// ============================================================================
// Money
// ============================================================================

/// Currency label printed after every amount
pub const CURRENCY: &str = "FCFA";

/// Decimal places shown for amounts
pub const AMOUNT_DECIMALS: u32 = 0;

/// Convert a payload amount to Decimal
///
/// Non-finite values are rejected by receipt validation before any sum runs.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in amount, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round for display (banker's rounding, like the printed receipts always had)
fn round_display(amount: Decimal, decimals: u32) -> Decimal {
    amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
}

/// Fixed-point amount without grouping (`2.5` → `"2"` with 0 decimals)
pub fn format_fixed(amount: Decimal) -> String {
    let rounded = round_display(amount, AMOUNT_DECIMALS);
    format!("{:.*}", AMOUNT_DECIMALS as usize, rounded)
}

/// Amount with `,` thousands separators (`1234567` → `"1,234,567"`)
pub fn format_grouped(amount: Decimal) -> String {
    let fixed = format_fixed(amount);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" is not a useful amount
    let sign = if grouped.chars().all(|c| c == '0' || c == ',') && frac_part.is_none() {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_params() {
        let narrow = LayoutParams::for_width(PrinterWidth::Mm58);
        assert_eq!((narrow.max_width, narrow.article_name_width), (32, 14));
        let wide = LayoutParams::for_width(PrinterWidth::Mm80);
        assert_eq!((wide.max_width, wide.article_name_width), (48, 24));
    }

    #[test]
    fn test_truncate_ellipsis() {
        assert_eq!(truncate_ellipsis("short", 10), "short");
        assert_eq!(truncate_ellipsis("exactly 10", 10), "exactly 10");
        let long = "Hôtel de la Plage et des Flots Bleus";
        let cut = truncate_ellipsis(long, 32);
        assert_eq!(text_width(&cut), 32);
        assert_eq!(cut, "Hôtel de la Plage et des Flot...");
    }

    #[test]
    fn test_fit_column() {
        assert_eq!(fit_column("Eau", 6), "Eau   ");
        assert_eq!(fit_column("Croissant beurré", 14), "Croissant beu.");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("hi", 5, false), "hi   ");
        assert_eq!(pad("hi", 5, true), "   hi");
        assert_eq!(pad("hello world", 5, false), "hello world");
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(
            wrap_words("Chambre double vue mer avec balcon", 16),
            vec!["Chambre double", "vue mer avec", "balcon"]
        );
        assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_words("   ", 10).is_empty());
    }

    #[test]
    fn test_format_amounts() {
        assert_eq!(format_fixed(to_decimal(2.5)), "2");
        assert_eq!(format_fixed(to_decimal(3.5)), "4");
        assert_eq!(format_fixed(to_decimal(25.0)), "25");
        assert_eq!(format_grouped(to_decimal(1234567.0)), "1,234,567");
        assert_eq!(format_grouped(to_decimal(999.0)), "999");
        assert_eq!(format_grouped(to_decimal(-15000.0)), "-15,000");
        assert_eq!(format_grouped(to_decimal(-0.4)), "0");
    }
}
