//! Numeric values of the builtin functions.

use std::f64::consts::{FRAC_PI_2, LOG10_E};

/// Applies the builtin function with the given canonical name to a value.
///
/// Returns [`None`] if the function is not a builtin or the value lies outside its domain.
pub fn apply(name: &str, x: f64) -> Option<f64> {
    let value = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "csc" => 1.0 / x.sin(),
        "sec" => 1.0 / x.cos(),
        "cot" => 1.0 / x.tan(),
        "arcsin" => {
            if x.abs() > 1.0 {
                return None;
            }
            x.asin()
        },
        "arccos" => {
            if x.abs() > 1.0 {
                return None;
            }
            x.acos()
        },
        "arctan" => x.atan(),
        "arccsc" => {
            if x.abs() < 1.0 {
                return None;
            }
            (1.0 / x).asin()
        },
        "arcsec" => {
            if x.abs() < 1.0 {
                return None;
            }
            (1.0 / x).acos()
        },
        // continuous on the whole line, with values in (0, pi)
        "arccot" => FRAC_PI_2 - x.atan(),
        "sqrt" => {
            if x < 0.0 {
                return None;
            }
            x.sqrt()
        },
        "abs" => x.abs(),
        "exp" | "expb" => x.exp(),
        "ln" => {
            if x <= 0.0 {
                return None;
            }
            x.ln()
        },
        "log10" => {
            if x <= 0.0 {
                return None;
            }
            LOG10_E * x.ln()
        },
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use assert_float_eq::{
        afe_abs,
        afe_absolute_error_msg,
        afe_is_absolute_eq,
        assert_float_absolute_eq,
    };
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn domains() {
        assert_eq!(apply("arcsin", 1.5), None);
        assert_eq!(apply("arccsc", 0.5), None);
        assert_eq!(apply("sqrt", -1.0), None);
        assert_eq!(apply("ln", 0.0), None);
        assert_eq!(apply("log10", -3.0), None);
        assert_eq!(apply("nope", 1.0), None);
    }

    #[test]
    fn values() {
        assert_float_absolute_eq!(apply("arccot", 0.0).unwrap(), FRAC_PI_2);
        assert_float_absolute_eq!(apply("arccot", 1.0).unwrap(), FRAC_PI_2 / 2.0);
        assert_float_absolute_eq!(apply("arccot", -1.0).unwrap(), 3.0 * FRAC_PI_2 / 2.0);
        assert_float_absolute_eq!(apply("log10", 1000.0).unwrap(), 3.0);
        assert_float_absolute_eq!(apply("arcsec", 2.0).unwrap(), std::f64::consts::FRAC_PI_3);
        assert_eq!(apply("abs", -4.0), Some(4.0));
    }
}
