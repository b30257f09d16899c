//! Calculator modes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluation and display context for one calculation.
///
/// Each mode selects a function scope for the evaluator and a display
/// format for the result. Auto-detection checks the modes in priority
/// order Developer > Finance > Advanced and falls back to Basic; see
/// [`detect_mode`](crate::calculator::detect_mode).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Standard arithmetic, percent phrases, degree-based trig.
    #[default]
    Basic,
    /// Hex/binary literals, `**`, boolean operators.
    Developer,
    /// Finance functions (npv/fv/pmt), VAT phrases, currency display.
    Finance,
    /// Trigonometry and unit-aware arithmetic.
    Advanced,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Basic, Mode::Developer, Mode::Finance, Mode::Advanced];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Developer => "developer",
            Mode::Finance => "finance",
            Mode::Advanced => "advanced",
        }
    }

    /// Parse a mode name as entered in the REPL.
    pub fn parse(name: &str) -> Option<Mode> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name() == name.trim().to_lowercase())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::parse(mode.name()), Some(mode));
        }
        assert_eq!(Mode::parse(" Finance "), Some(Mode::Finance));
        assert_eq!(Mode::parse("scientific"), None);
    }
}
