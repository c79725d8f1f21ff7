//! Floating point comparisons for values that made a round trip through a backend.

use crate::TestContext;

/// Relative comparison, for values written as SQL text and read back as doubles.
///
/// `|a - b| < ε · (1 + max(|a|, |b|))` with `ε = 100 · f32::EPSILON`.
pub fn are_doubles_approx_equal(a: f64, b: f64) -> bool {
    let epsilon = f64::from(f32::EPSILON) * 100.0;
    let scale = 1.0;

    (a - b).abs() < epsilon * (scale + a.abs().max(b.abs()))
}

#[allow(clippy::float_cmp)]
pub fn are_doubles_exactly_equal(a: f64, b: f64) -> bool {
    a == b
}

pub fn are_doubles_equal(ctx: &TestContext, a: f64, b: f64) -> bool {
    if ctx.has_fp_bug() {
        are_doubles_approx_equal(a, b)
    } else {
        are_doubles_exactly_equal(a, b)
    }
}
