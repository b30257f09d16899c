//! Per-mode function reference and example inputs.
//!
//! Static data backing the CLI's `--examples` listing and the REPL's
//! `:examples` command: insertable templates grouped per mode, plus a few
//! representative inputs that exercise each mode's dialect.

use crate::calculator::Mode;

/// Insertable template for a function or symbol.
#[derive(Clone, Copy, Debug)]
pub struct InsertItem {
    pub label: &'static str,
    pub insert: &'static str,
    /// Caret offset into `insert` after insertion.
    pub caret: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct FunctionGroup {
    pub title: &'static str,
    pub items: &'static [InsertItem],
}

const STANDARD: FunctionGroup = FunctionGroup {
    title: "Standard",
    items: &[
        InsertItem {
            label: "sin()",
            insert: "sin()",
            caret: 4,
        },
        InsertItem {
            label: "cos()",
            insert: "cos()",
            caret: 4,
        },
        InsertItem {
            label: "tan()",
            insert: "tan()",
            caret: 4,
        },
        InsertItem {
            label: "log()",
            insert: "log()",
            caret: 4,
        },
        InsertItem {
            label: "ln()",
            insert: "ln()",
            caret: 3,
        },
        InsertItem {
            label: "sqrt()",
            insert: "sqrt()",
            caret: 5,
        },
    ],
};

const DEVELOPER: FunctionGroup = FunctionGroup {
    title: "Developer",
    items: &[
        InsertItem {
            label: "**",
            insert: "**",
            caret: 2,
        },
        InsertItem {
            label: "&&",
            insert: " && ",
            caret: 4,
        },
        InsertItem {
            label: "||",
            insert: " || ",
            caret: 4,
        },
        InsertItem {
            label: "0x..",
            insert: "0x",
            caret: 2,
        },
        InsertItem {
            label: "0b..",
            insert: "0b",
            caret: 2,
        },
    ],
};

const FINANCE: FunctionGroup = FunctionGroup {
    title: "Finance",
    items: &[
        InsertItem {
            label: "npv()",
            insert: "npv(rate, c1, c2, c3)",
            caret: 4,
        },
        InsertItem {
            label: "fv()",
            insert: "fv(pv, rate, n)",
            caret: 3,
        },
        InsertItem {
            label: "pmt()",
            insert: "pmt(rate, n, pv)",
            caret: 4,
        },
        InsertItem {
            label: "Brutto",
            insert: "Brutto 119 bei MwSt 19%",
            caret: 8,
        },
        InsertItem {
            label: "Netto",
            insert: "Netto 100 bei MwSt 19%",
            caret: 7,
        },
    ],
};

const ADVANCED: FunctionGroup = FunctionGroup {
    title: "Advanced",
    items: &[
        InsertItem {
            label: "deg",
            insert: "°",
            caret: 1,
        },
        InsertItem {
            label: "rad",
            insert: " rad",
            caret: 4,
        },
        InsertItem {
            label: "m",
            insert: " m",
            caret: 2,
        },
        InsertItem {
            label: "cm",
            insert: " cm",
            caret: 3,
        },
    ],
};

pub fn function_groups(mode: Mode) -> &'static [FunctionGroup] {
    match mode {
        Mode::Basic => &[STANDARD],
        Mode::Developer => &[STANDARD, DEVELOPER],
        Mode::Finance => &[STANDARD, FINANCE],
        Mode::Advanced => &[STANDARD, ADVANCED],
    }
}

/// Representative inputs per mode, shown by `--examples` and used as a
/// smoke test of the whole pipeline.
pub fn examples(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Basic => &["15% von 249", "80 geteilt durch 4", "2 hoch 5", "√9 + 10%"],
        Mode::Developer => &["2**5", "0xFF && 1", "0b1010 + 2", "sqrt(9) + 1"],
        Mode::Finance => &[
            "npv(0.08, -1000, 400, 400, 400)",
            "fv(1000, 0.05, 3)",
            "Brutto 119 bei MwSt 19%",
        ],
        Mode::Advanced => &["sin(30°)", "cos(45°)", "sqrt(2^5)", "3 m + 40 cm"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{self, Mode};

    #[test]
    fn test_groups_include_mode_section() {
        assert_eq!(function_groups(Mode::Basic).len(), 1);
        for mode in [Mode::Developer, Mode::Finance, Mode::Advanced] {
            let groups = function_groups(mode);
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[0].title, "Standard");
        }
    }

    #[test]
    fn test_caret_offsets_fit_templates() {
        for mode in Mode::ALL {
            for group in function_groups(mode) {
                for item in group.items {
                    assert!(item.caret <= item.insert.chars().count(), "{}", item.label);
                }
            }
        }
    }

    #[test]
    fn test_every_example_evaluates() {
        for mode in Mode::ALL {
            for example in examples(mode) {
                let evaluation = calculator::evaluate(example, mode, true)
                    .unwrap_or_else(|| panic!("no result for {example:?}"));
                assert!(
                    evaluation.result.is_success(),
                    "example {example:?} failed in {mode} mode: {:?}",
                    evaluation.result
                );
            }
        }
    }
}
