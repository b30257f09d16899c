//! Per-mode function scopes for the scope-capable evaluator backend.
//!
//! A scope is an immutable bundle of override functions selected once per
//! evaluation. Basic and advanced reinterpret trigonometry in degrees and
//! `log` as the decadic logarithm; finance adds npv/fv/pmt; developer
//! carries no overrides at all (the native backend handles its dialect).

use crate::calculator::Mode;

/// Closed set of function bundles handed to the scoped backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionScope {
    Basic,
    Developer,
    Finance,
    Advanced,
}

impl From<Mode> for FunctionScope {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Basic => FunctionScope::Basic,
            Mode::Developer => FunctionScope::Developer,
            Mode::Finance => FunctionScope::Finance,
            Mode::Advanced => FunctionScope::Advanced,
        }
    }
}

impl FunctionScope {
    /// Compile the scope into an evaluator context. Contexts are built
    /// fresh per evaluation and never mutated afterwards.
    pub(crate) fn build_context(self) -> meval::Context<'static> {
        let mut ctx = meval::Context::new();
        match self {
            FunctionScope::Basic | FunctionScope::Advanced => {
                ctx.func("sin", sin_deg)
                    .func("cos", cos_deg)
                    .func("tan", tan_deg)
                    .func("log", decadic_log);
            }
            FunctionScope::Finance => {
                ctx.funcn("npv", npv, 2..).func3("fv", fv).func3("pmt", pmt);
            }
            FunctionScope::Developer => {}
        }
        ctx
    }
}

fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

fn tan_deg(x: f64) -> f64 {
    x.to_radians().tan()
}

fn decadic_log(x: f64) -> f64 {
    x.log10()
}

/// Net present value: the first cash flow is discounted one full period.
fn npv(args: &[f64]) -> f64 {
    let rate = args[0];
    args[1..]
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + rate).powi(i as i32 + 1))
        .sum()
}

/// Future value of `pv` after `n` periods at `rate`.
fn fv(pv: f64, rate: f64, n: f64) -> f64 {
    pv * (1.0 + rate).powf(n)
}

/// Periodic payment amortizing `pv` over `n` periods at `rate`.
fn pmt(rate: f64, n: f64, pv: f64) -> f64 {
    pv * rate / (1.0 - (1.0 + rate).powf(-n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_degree_trig() {
        assert!(close(sin_deg(30.0), 0.5));
        assert!(close(cos_deg(60.0), 0.5));
        assert!(close(tan_deg(45.0), 1.0));
    }

    #[test]
    fn test_decadic_log() {
        assert!(close(decadic_log(1000.0), 3.0));
    }

    #[test]
    fn test_npv() {
        // Zero rate degenerates to a plain sum.
        assert!(close(npv(&[0.0, 50.0, 50.0]), 100.0));
        let value = npv(&[0.08, -1000.0, 400.0, 400.0, 400.0]);
        let expected = -1000.0 / 1.08
            + 400.0 / 1.08_f64.powi(2)
            + 400.0 / 1.08_f64.powi(3)
            + 400.0 / 1.08_f64.powi(4);
        assert!(close(value, expected));
        assert!(value > 28.0 && value < 29.0);
    }

    #[test]
    fn test_fv() {
        assert!(close(fv(1000.0, 0.05, 3.0), 1157.625));
    }

    #[test]
    fn test_pmt() {
        // 12 monthly payments on 1000 at 1% per period.
        let payment = pmt(0.01, 12.0, 1000.0);
        assert!(close(payment, 1000.0 * 0.01 / (1.0 - 1.01_f64.powf(-12.0))));
        assert!(payment > 83.0 && payment < 90.0);
    }

    #[test]
    fn test_scopes_resolve_in_context() {
        let ctx = FunctionScope::Basic.build_context();
        let expr: meval::Expr = "sin(30) + log(100)".parse().unwrap();
        assert!(close(expr.eval_with_context(ctx).unwrap(), 2.5));
    }
}
