/// `mod`: remainder of the truncated operands, carrying the dividend's sign.
/// NaN when an operand is not finite or the truncated divisor is zero.
pub(crate) fn xpath_mod(dividend: f64, divisor: f64) -> f64 {
    if !dividend.is_finite() || !divisor.is_finite() {
        return f64::NAN;
    }
    let (a, b) = (dividend.trunc(), divisor.trunc());
    if b == 0.0 { f64::NAN } else { a % b }
}
