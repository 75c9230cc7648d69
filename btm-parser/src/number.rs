//! Exact rational and approximate real scalar values.

use std::{fmt, ops::{Add, Div, Mul, Neg, Sub}};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Computes the greatest common divisor of two integers using Euclid's algorithm.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = if a < b { (b, a) } else { (a, b) };
    while b > 0 {
        let c = a % b;
        a = b;
        b = c;
    }
    a
}

/// A scalar value, either an exact rational number or an approximate real number.
///
/// Arithmetic between two rationals stays rational (reduced to lowest terms) unless the exact
/// result cannot be represented, in which case it degrades to a real. Any operation involving a
/// real yields a real. Division by zero never panics; it produces a real `NaN`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Number {
    /// A rational number `p / q` with `q > 0`, always in lowest terms.
    Rational { p: i64, q: i64 },

    /// A floating-point number.
    Real(f64),
}

impl Number {
    /// Creates a rational number `p / q`, reduced to lowest terms.
    ///
    /// A zero denominator produces a real `NaN`.
    pub fn rational(p: i64, q: i64) -> Self {
        if q == 0 {
            return Number::Real(f64::NAN);
        }
        if p == 0 {
            return Number::Rational { p: 0, q: 1 };
        }

        let (p, q) = if q < 0 {
            match (p.checked_neg(), q.checked_neg()) {
                (Some(p), Some(q)) => (p, q),
                _ => return Number::Real(p as f64 / q as f64),
            }
        } else {
            (p, q)
        };

        let g = gcd(p.unsigned_abs(), q.unsigned_abs());
        // `g` divides both, and is at least 1 since `q > 0`
        let g = g as i64;
        if g <= 0 {
            return Number::Real(p as f64 / q as f64);
        }
        Number::Rational { p: p / g, q: q / g }
    }

    /// Creates an integer.
    pub fn integer(n: i64) -> Self {
        Number::Rational { p: n, q: 1 }
    }

    /// Creates a real number.
    pub fn real(v: f64) -> Self {
        Number::Real(v)
    }

    /// Creates a number from a float, choosing an exact integer representation if the value is
    /// integral.
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
            Number::integer(v as i64)
        } else {
            Number::Real(v)
        }
    }

    /// Returns the numerical value of this number.
    pub fn value(&self) -> f64 {
        match *self {
            Number::Rational { p, q } => p as f64 / q as f64,
            Number::Real(v) => v,
        }
    }

    /// Returns true if this number is an exact rational.
    pub fn is_rational(&self) -> bool {
        matches!(self, Number::Rational { .. })
    }

    /// Returns true if this number is an exact integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Rational { q: 1, .. })
    }

    /// Returns true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.value() == 0.0
    }

    /// Returns true if this number is one.
    pub fn is_one(&self) -> bool {
        self.value() == 1.0
    }

    /// Returns true if this number is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.value() < 0.0
    }

    /// Returns true if this number is `NaN`.
    pub fn is_nan(&self) -> bool {
        self.value().is_nan()
    }

    /// The additive inverse.
    pub fn add_inverse(self) -> Self {
        match self {
            Number::Rational { p, q } => match p.checked_neg() {
                Some(p) => Number::Rational { p, q },
                None => Number::Real(-(p as f64) / q as f64),
            },
            Number::Real(v) => Number::Real(-v),
        }
    }

    /// The multiplicative inverse. The inverse of zero is `NaN`.
    pub fn mult_inverse(self) -> Self {
        match self {
            Number::Rational { p: 0, .. } => Number::Real(f64::NAN),
            Number::Rational { p, q } => Number::rational(q, p),
            Number::Real(v) if v == 0.0 => Number::Real(f64::NAN),
            Number::Real(v) => Number::Real(1.0 / v),
        }
    }

    /// Raises this number to an integer power, exactly if this number is rational.
    ///
    /// Returns [`None`] if the exponent is negative and this number is zero.
    pub fn pow_exact(self, n: i64) -> Option<Self> {
        if n < 0 {
            if self.is_zero() {
                return None;
            }
            return self.mult_inverse().pow_exact(n.checked_neg()?);
        }

        match self {
            Number::Rational { p, q } => {
                let exact = u32::try_from(n).ok()
                    .and_then(|n| Some((p.checked_pow(n)?, q.checked_pow(n)?)));
                Some(match exact {
                    Some((p, q)) => Number::rational(p, q),
                    None => Number::Real(self.value().powf(n as f64)),
                })
            },
            Number::Real(v) => Some(Number::Real(v.powf(n as f64))),
        }
    }

    /// Formats the number for LaTeX.
    pub fn to_tex(&self) -> String {
        match *self {
            Number::Rational { p, q: 1 } => p.to_string(),
            Number::Rational { p, q } if p < 0 => format!("-\\frac{{{}}}{{{}}}", p.unsigned_abs(), q),
            Number::Rational { p, q } => format!("\\frac{{{}}}{{{}}}", p, q),
            Number::Real(v) if v.is_nan() => "\\mathrm{NaN}".to_string(),
            Number::Real(v) if v.is_infinite() => {
                if v < 0.0 { "-\\infty".to_string() } else { "\\infty".to_string() }
            },
            Number::Real(_) => self.to_string(),
        }
    }

    /// Formats the number as content MathML.
    pub fn to_mathml(&self) -> String {
        format!("<cn>{}</cn>", self)
    }

    /// Applies an exact operation on two rationals, falling back to the floating-point operation
    /// when either side is real or the exact result overflows.
    fn combine(
        self,
        other: Self,
        exact: impl FnOnce(i64, i64, i64, i64) -> Option<(i64, i64)>,
        approx: impl FnOnce(f64, f64) -> f64,
    ) -> Self {
        if let (Number::Rational { p: a, q: b }, Number::Rational { p: c, q: d }) = (self, other) {
            if let Some((p, q)) = exact(a, b, c, d) {
                return Number::rational(p, q);
            }
        }
        Number::Real(approx(self.value(), other.value()))
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::integer(0)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::integer(n)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Rational { p: a, q: b }, Number::Rational { p: c, q: d }) => a == c && b == d,
            _ => self.value() == other.value(),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, other: Self) -> Self::Output {
        self.combine(
            other,
            |a, b, c, d| Some((a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?, b.checked_mul(d)?)),
            |x, y| x + y,
        )
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, other: Self) -> Self::Output {
        self.combine(
            other,
            |a, b, c, d| Some((a.checked_mul(d)?.checked_sub(c.checked_mul(b)?)?, b.checked_mul(d)?)),
            |x, y| x - y,
        )
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, other: Self) -> Self::Output {
        self.combine(
            other,
            |a, b, c, d| Some((a.checked_mul(c)?, b.checked_mul(d)?)),
            |x, y| x * y,
        )
    }
}

impl Div for Number {
    type Output = Number;

    fn div(self, other: Self) -> Self::Output {
        if other.is_zero() {
            return Number::Real(f64::NAN);
        }
        self.combine(
            other,
            |a, b, c, d| Some((a.checked_mul(d)?, b.checked_mul(c)?)),
            |x, y| x / y,
        )
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Self::Output {
        self.add_inverse()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Number::Rational { p, q: 1 } => write!(f, "{}", p),
            Number::Rational { p, q } => write!(f, "{}/{}", p, q),
            Number::Real(v) if v.is_nan() => write!(f, "NaN"),
            Number::Real(v) if v.is_infinite() => {
                if v < 0.0 { write!(f, "-inf") } else { write!(f, "inf") }
            },
            Number::Real(v) => {
                // ten decimal places, printed in shortest form
                let rounded = if v.abs() < 1e15 { (v * 1e10).round() / 1e10 } else { v };
                if rounded == 0.0 {
                    write!(f, "0")
                } else {
                    write!(f, "{}", rounded)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn reduce_on_construction() {
        assert_eq!(Number::rational(4, 8), Number::Rational { p: 1, q: 2 });
        assert_eq!(Number::rational(3, -9), Number::Rational { p: -1, q: 3 });
        assert_eq!(Number::rational(0, -5), Number::Rational { p: 0, q: 1 });
    }

    #[test]
    fn zero_denominator_is_nan() {
        assert!(Number::rational(1, 0).is_nan());
        assert!((Number::integer(3) / Number::integer(0)).is_nan());
        assert!(Number::integer(0).mult_inverse().is_nan());
    }

    #[test]
    fn exact_rational_arithmetic() {
        let sum = Number::rational(1, 3) + Number::rational(1, 6);
        assert_eq!(sum, Number::rational(1, 2));
        assert!(sum.is_rational());

        assert_eq!(Number::rational(2, 3) * Number::rational(3, 4), Number::rational(1, 2));
        assert_eq!(Number::rational(1, 2) - Number::rational(3, 4), Number::rational(-1, 4));
        assert_eq!(Number::rational(1, 2) / Number::rational(1, 4), Number::integer(2));
        assert_eq!(-Number::rational(2, 5), Number::rational(-2, 5));
    }

    #[test]
    fn real_contaminates() {
        let sum = Number::rational(1, 2) + Number::real(0.25);
        assert!(!sum.is_rational());
        assert_eq!(sum.value(), 0.75);
    }

    #[test]
    fn overflow_degrades_to_real() {
        let big = Number::integer(i64::MAX);
        let product = big * Number::integer(4);
        assert!(!product.is_rational());
        assert_eq!(product.value(), i64::MAX as f64 * 4.0);
    }

    #[test]
    fn exact_powers() {
        assert_eq!(Number::rational(2, 3).pow_exact(3), Some(Number::rational(8, 27)));
        assert_eq!(Number::integer(2).pow_exact(-2), Some(Number::rational(1, 4)));
        assert_eq!(Number::integer(0).pow_exact(-1), None);
    }

    #[test]
    fn display() {
        assert_eq!(Number::rational(-3, 4).to_string(), "-3/4");
        assert_eq!(Number::integer(12).to_string(), "12");
        assert_eq!(Number::real(0.1 + 0.2).to_string(), "0.3");
        assert_eq!(Number::real(2.5).to_string(), "2.5");
        assert_eq!(Number::real(-0.0).to_string(), "0");
        assert_eq!(Number::real(f64::NAN).to_string(), "NaN");
        assert_eq!(Number::real(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn tex() {
        assert_eq!(Number::rational(-3, 4).to_tex(), "-\\frac{3}{4}");
        assert_eq!(Number::rational(1, 2).to_tex(), "\\frac{1}{2}");
        assert_eq!(Number::real(f64::NAN).to_tex(), "\\mathrm{NaN}");
    }

    #[test]
    fn from_f64_prefers_integers() {
        assert!(Number::from_f64(4.0).is_integer());
        assert!(!Number::from_f64(4.5).is_rational());
    }
}
