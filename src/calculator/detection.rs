//! Mode auto-detection from raw input.
//!
//! Each mode owns a set of discriminating regex cues, checked against the
//! raw (pre-normalization) input in a fixed priority order: developer,
//! then finance, then advanced. The first mode with any matching cue
//! wins; no scoring or combination. Inputs matching nothing are basic.
//! The ordering matters because cue sets overlap: structural cues like
//! hex literals are far more specific than a stray "e" keyword.

use lazy_static::lazy_static;
use regex::Regex;

use crate::calculator::Mode;

struct ModeCues {
    mode: Mode,
    cues: Vec<Regex>,
}

lazy_static! {
    static ref MODE_CUES: Vec<ModeCues> = vec![
        ModeCues {
            mode: Mode::Developer,
            cues: vec![
                Regex::new(r"(?i)\b0x[0-9a-f]+\b").unwrap(),
                Regex::new(r"(?i)\b0b[01]+\b").unwrap(),
                Regex::new(r"&&|\|\|").unwrap(),
                Regex::new(r"\*\*").unwrap(),
                Regex::new(r"(?i)\b(and|or)\s*\(").unwrap(),
            ],
        },
        ModeCues {
            mode: Mode::Finance,
            cues: vec![
                Regex::new(r"(?i)\b(npv|fv|pmt)\s*\(").unwrap(),
                Regex::new(r"(?i)\b(brutto|netto|gross|net)\s+\d").unwrap(),
                Regex::new(r"(?i)\b(mwst|vat)\s+\d").unwrap(),
                Regex::new(r"(?i)\b(mwst|umsatzsteuer|vat)\b").unwrap(),
                Regex::new(r"(?i)\b(euro|eur)\b").unwrap(),
                Regex::new(r"(?i)\b(zinsen|zinssatz|kredit|anlage|interest|loan|investment)\b")
                    .unwrap(),
            ],
        },
        ModeCues {
            mode: Mode::Advanced,
            cues: vec![
                Regex::new(r"(?i)\b(sin|cos|tan|asin|acos|atan)\s*\(").unwrap(),
                Regex::new(r"(?i)\bdeg\b").unwrap(),
                Regex::new(r"\d\s*°").unwrap(),
                Regex::new(r"(?i)\b(rad|grad)\b").unwrap(),
                Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(m|cm|km|kg|g)\b").unwrap(),
                Regex::new(r"(?i)\b(sqrt|log|ln|exp)\s*\(").unwrap(),
                Regex::new(r"(?i)\b(pi|e)\b").unwrap(),
            ],
        },
    ];
}

/// Infer the best-fit mode for a raw input string.
pub fn detect_mode(input: &str) -> Mode {
    MODE_CUES
        .iter()
        .find(|entry| entry.cues.iter().any(|cue| cue.is_match(input)))
        .map(|entry| entry.mode)
        .unwrap_or(Mode::Basic)
}
