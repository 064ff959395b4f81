//! Degenerate-value guards for unit conversions.
//!
//! Zero divisors and non-finite results are expected in steady state (a
//! process that never issued a read syscall has no average read size), so
//! they normalize to 0 instead of surfacing as errors.

/// Replace NaN and infinities with 0.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Divide, yielding 0 for a zero divisor or a non-finite quotient.
#[inline]
pub fn safe_div(numerator: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_regular() {
        assert_eq!(safe_div(2048.0, 1024.0), 2.0);
    }

    #[test]
    fn test_safe_div_zero_divisor() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_safe_div_non_finite() {
        assert_eq!(safe_div(f64::INFINITY, 2.0), 0.0);
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or_zero(-3.5), -3.5);
    }
}
