//! Mode-specific syntax rewrites, applied on top of the lexical pass.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::calculator::Mode;

lazy_static! {
    static ref POW_JS: Regex = Regex::new(r"\*\*").unwrap();
    static ref WORD_AND: Regex = Regex::new(r"\band\b").unwrap();
    static ref WORD_OR: Regex = Regex::new(r"\bor\b").unwrap();
    static ref HEX_LITERAL: Regex = Regex::new(r"\b0x[0-9a-f]+\b").unwrap();
    static ref BIN_LITERAL: Regex = Regex::new(r"\b0b[01]+\b").unwrap();
    static ref NUMBER_DEG: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*deg\b").unwrap();
    static ref NUMBER_DEGREE_SIGN: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*°").unwrap();
    /// VAT phrases. The rate appears either as a raw percent or already
    /// converted to `(y/100)` by the lexical bare-percent rule.
    static ref GROSS_VAT: Regex = Regex::new(
        r"\b(?:brutto|gross)\s+(\d+(?:\.\d+)?)\s+(?:bei\s+mwst|at\s+vat)\s*(?:\((\d+(?:\.\d+)?)/100\)|(\d+(?:\.\d+)?)\s*%)"
    )
    .unwrap();
    static ref NET_VAT: Regex = Regex::new(
        r"\b(?:netto|net)\s+(\d+(?:\.\d+)?)\s+(?:bei\s+mwst|at\s+vat)\s*(?:\((\d+(?:\.\d+)?)/100\)|(\d+(?:\.\d+)?)\s*%)"
    )
    .unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// Apply the mode-specific transforms to a lexically normalized
/// expression. The caller re-applies the validity gate on the result.
pub(crate) fn apply(expr: &str, mode: Mode) -> String {
    let mut s = expr.to_string();
    match mode {
        Mode::Developer => {
            s = POW_JS.replace_all(&s, "^").into_owned();
            // The developer backend natively speaks `&&`/`||`; spoken
            // boolean words are folded into that dialect.
            s = WORD_AND.replace_all(&s, "&&").into_owned();
            s = WORD_OR.replace_all(&s, "||").into_owned();
            s = HEX_LITERAL
                .replace_all(&s, |caps: &Captures| fold_literal(&caps[0], 16))
                .into_owned();
            s = BIN_LITERAL
                .replace_all(&s, |caps: &Captures| fold_literal(&caps[0], 2))
                .into_owned();
        }
        Mode::Advanced => {
            s = NUMBER_DEG.replace_all(&s, "${1} deg").into_owned();
            s = NUMBER_DEGREE_SIGN.replace_all(&s, "${1} deg").into_owned();
        }
        Mode::Finance => {
            s = GROSS_VAT
                .replace_all(&s, |caps: &Captures| vat_formula(caps, '*'))
                .into_owned();
            s = NET_VAT
                .replace_all(&s, |caps: &Captures| vat_formula(caps, '/'))
                .into_owned();
        }
        Mode::Basic => {}
    }
    SPACES.replace_all(&s, " ").trim().to_string()
}

/// Fold a hex or binary literal to its decimal spelling. Tokens that do
/// not parse (e.g. overflow) are left untouched.
fn fold_literal(token: &str, radix: u32) -> String {
    match i64::from_str_radix(&token[2..], radix) {
        Ok(value) => value.to_string(),
        Err(_) => token.to_string(),
    }
}

fn vat_formula(caps: &Captures, op: char) -> String {
    let amount = &caps[1];
    let rate = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
        .unwrap_or("0");
    format!("({amount}){op}(1+{rate}/100)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_developer_power_operator() {
        assert_eq!(apply("2**5", Mode::Developer), "2^5");
    }

    #[test]
    fn test_developer_hex_and_binary_folding() {
        assert_eq!(apply("0xff+1", Mode::Developer), "255+1");
        assert_eq!(apply("0b1010+2", Mode::Developer), "10+2");
        assert_eq!(apply("0x1f*0b11", Mode::Developer), "31*3");
    }

    #[test]
    fn test_developer_overflowing_literal_left_alone() {
        assert_eq!(
            apply("0xffffffffffffffffff", Mode::Developer),
            "0xffffffffffffffffff"
        );
    }

    #[test]
    fn test_developer_boolean_words() {
        assert_eq!(apply("1 and 0", Mode::Developer), "1 && 0");
        assert_eq!(apply("1 or 0", Mode::Developer), "1 || 0");
    }

    #[test]
    fn test_advanced_degree_sign() {
        assert_eq!(apply("sin(30°)", Mode::Advanced), "sin(30 deg)");
        assert_eq!(apply("45deg", Mode::Advanced), "45 deg");
    }

    #[test]
    fn test_finance_vat_phrases() {
        // Rate as produced by the lexical bare-percent rule.
        assert_eq!(
            apply("brutto 119 bei mwst(19/100)", Mode::Finance),
            "(119)*(1+19/100)"
        );
        assert_eq!(
            apply("netto 100 bei mwst(19/100)", Mode::Finance),
            "(100)/(1+19/100)"
        );
        // Raw percent form.
        assert_eq!(
            apply("gross 119 at vat 19%", Mode::Finance),
            "(119)*(1+19/100)"
        );
    }

    #[test]
    fn test_basic_mode_is_identity() {
        assert_eq!(apply("(20/100)*70", Mode::Basic), "(20/100)*70");
    }
}
