//! French-readable ASCII transliteration
//!
//! Narrow 58mm printers usually only render 7-bit ASCII reliably. Instead of
//! letting accented text degrade to `?`, it is rewritten into a readable
//! plain-ASCII approximation:
//!
//! 1. A curated table handles the common Western European letters,
//!    ligatures (`œ` → `oe`), currency and typographic symbols.
//! 2. Anything left is canonically decomposed (NFD) and its combining
//!    marks are dropped, keeping the base letter.
//!
//! The function is total and idempotent. Characters with no ASCII base
//! (emoji, CJK, ...) pass through unchanged; the safe encoder deals with them.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// How a table entry is spliced into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Replaced in place (`é` → `e`, `½` → `1/2`)
    Inline(&'static str),
    /// A currency word, kept apart from adjacent text (`15€` → `15 EUR`)
    Word(&'static str),
}

/// Look up the table entry for a single character
pub fn lookup(ch: char) -> Option<Replacement> {
    use Replacement::{Inline, Word};

    let r = match ch {
        // Lowercase vowels
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => Inline("a"),
        'è' | 'é' | 'ê' | 'ë' => Inline("e"),
        'ì' | 'í' | 'î' | 'ï' => Inline("i"),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => Inline("o"),
        'ù' | 'ú' | 'û' | 'ü' => Inline("u"),
        'ý' | 'ÿ' => Inline("y"),

        // Uppercase vowels
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => Inline("A"),
        'È' | 'É' | 'Ê' | 'Ë' => Inline("E"),
        'Ì' | 'Í' | 'Î' | 'Ï' => Inline("I"),
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => Inline("O"),
        'Ù' | 'Ú' | 'Û' | 'Ü' => Inline("U"),
        'Ý' | 'Ÿ' => Inline("Y"),

        // Consonants
        'ç' => Inline("c"),
        'Ç' => Inline("C"),
        'ñ' => Inline("n"),
        'Ñ' => Inline("N"),
        'ß' => Inline("ss"),

        // Ligatures
        'œ' => Inline("oe"),
        'Œ' => Inline("OE"),
        'æ' => Inline("ae"),
        'Æ' => Inline("AE"),

        // Currency
        '€' => Word("EUR"),
        '£' => Word("GBP"),
        '¢' => Inline("c"),

        // Units, exponents, fractions
        '°' => Inline("deg"),
        '¹' => Inline("1"),
        '²' => Inline("2"),
        '³' => Inline("3"),
        '½' => Inline("1/2"),
        '¼' => Inline("1/4"),
        '¾' => Inline("3/4"),
        '×' => Inline("x"),
        '÷' => Inline("/"),

        // Quotes
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => Inline("'"),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '«' | '»' => Inline("\""),

        // Dashes, ellipsis, bullets
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => Inline("-"),
        '\u{2026}' => Inline("..."),
        '\u{2022}' | '\u{00B7}' => Inline("*"),

        // Spaces
        '\u{00A0}' | '\u{202F}' | '\u{2009}' => Inline(" "),

        // Marks
        '©' => Inline("(c)"),
        '®' => Inline("(R)"),
        '™' => Inline("TM"),

        _ => return None,
    };
    Some(r)
}

/// Convert text to a 7-bit readable approximation
pub fn transliterate(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let replaced = apply_table(text);
    let stripped: String = replaced
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    // Decomposition can surface a tabled base letter (ǽ -> æ)
    apply_table(&stripped)
}

/// Apply every table entry everywhere it occurs
fn apply_table(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match lookup(ch) {
            Some(Replacement::Inline(s)) => out.push_str(s),
            Some(Replacement::Word(w)) => {
                if out.ends_with(|c: char| !c.is_whitespace()) {
                    out.push(' ');
                }
                out.push_str(w);
                if chars.peek().is_some_and(|c| c.is_alphanumeric()) {
                    out.push(' ');
                }
            }
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_french_words() {
        assert_eq!(transliterate("café"), "cafe");
        assert_eq!(transliterate("hôtel"), "hotel");
        assert_eq!(transliterate("François"), "Francois");
        assert_eq!(transliterate("crème brûlée"), "creme brulee");
        assert_eq!(transliterate("cœur"), "coeur");
        assert_eq!(transliterate("RÉCAPITULATIF"), "RECAPITULATIF");
        assert_eq!(transliterate("Tél: 01"), "Tel: 01");
    }

    #[test]
    fn test_currency_spacing() {
        assert_eq!(transliterate("15,50€"), "15,50 EUR");
        assert_eq!(transliterate("15,50 €"), "15,50 EUR");
        assert_eq!(transliterate("€5"), "EUR 5");
        assert_eq!(transliterate("€"), "EUR");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(transliterate("20°C"), "20degC");
        assert_eq!(transliterate("½ bouteille"), "1/2 bouteille");
        assert_eq!(transliterate("«Bonjour» – l’hôte…"), "\"Bonjour\" - l'hote...");
    }

    #[test]
    fn test_decomposition_fallback() {
        // Not in the table, stripped through NFD
        assert_eq!(transliterate("Łódź ǅ ā"), "Łodz ǅ a");
        // Combining sequence already decomposed
        assert_eq!(transliterate("e\u{0301}te\u{0301}"), "ete");
        // Decomposes to a tabled ligature
        assert_eq!(transliterate("ǽ"), "ae");
    }

    #[test]
    fn test_empty_and_ascii() {
        assert_eq!(transliterate(""), "");
        assert_eq!(transliterate("Plain text 123"), "Plain text 123");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Crème brûlée à 15,50€",
            "ǽ Œuvre «x» 😀 中文",
            "e\u{0301}\u{0327}",
            "Ångström ½ £3",
        ];
        for s in samples {
            let once = transliterate(s);
            assert_eq!(transliterate(&once), once, "not idempotent for {:?}", s);
        }
    }
}
