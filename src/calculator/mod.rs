//! Mode-aware smart-calculator core.
//!
//! The pipeline for one evaluation: classify the raw input (optional),
//! normalize it (lexical pass, then the mode-specific rewrite), gate on
//! evaluability, dispatch to the mode's backend and format the result.
//! Every stage is a pure transform; the caller owns the current mode and
//! passes it per call.

mod detection;
mod evaluation;
mod mode;
mod normalize;
mod rewrite;
mod scope;

pub use detection::detect_mode;
pub use evaluation::{CalcResult, CalcValue, ERROR_DISPLAY, evaluate_normalized};
pub use mode::Mode;
pub use normalize::{Normalized, normalize_input};
pub use scope::FunctionScope;

use tracing::{debug, warn};

/// One completed evaluation, annotated with the mode that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub result: CalcResult,
    /// Mode the evaluation actually ran in.
    pub mode: Mode,
    /// True when auto-detection overrode the caller's mode.
    pub auto_detected: bool,
}

/// Normalize `input` for `mode`: the lexical pass followed by the
/// mode-specific rewrite. Falls back to the trimmed original whenever a
/// stage produces a string with no digit and no arithmetic symbol.
pub fn normalize(input: &str, mode: Mode) -> Normalized {
    let lexical = normalize_input(input);
    if lexical.text.is_empty() {
        return lexical;
    }
    let rewritten = rewrite::apply(&lexical.text, mode);
    if normalize::is_evaluable(&rewritten) {
        Normalized {
            text: rewritten,
            fell_back: lexical.fell_back,
        }
    } else {
        Normalized::fallback(input)
    }
}

/// Evaluate free-form input.
///
/// Returns `None` for empty or whitespace-only input ("no result yet",
/// distinct from an evaluation error). When `auto_detect` is set the mode
/// is inferred from the raw input and `current_mode` only serves to flag
/// whether detection changed it.
pub fn evaluate(input: &str, current_mode: Mode, auto_detect: bool) -> Option<Evaluation> {
    if input.trim().is_empty() {
        return None;
    }

    let mode = if auto_detect {
        detect_mode(input)
    } else {
        current_mode
    };
    let auto_detected = mode != current_mode;

    let normalized = normalize(input, mode);
    if !normalize::is_evaluable(&normalized.text) {
        warn!("input {input:?} did not normalize to an evaluable expression");
        return Some(Evaluation {
            result: CalcResult::error(normalized.text),
            mode,
            auto_detected,
        });
    }
    if normalized.text != input.trim() {
        debug!("evaluating {input:?} as {:?} [{mode}]", normalized.text);
    }

    Some(Evaluation {
        result: evaluate_normalized(&normalized.text, mode),
        mode,
        auto_detected,
    })
}
