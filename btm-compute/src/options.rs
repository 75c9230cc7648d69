//! Numeric options shared by every operation performed in an environment.

use std::cmp::Ordering;

/// Tolerances and display switches of an environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Allow literals to carry a negative sign. When off, a negative literal is written as the
    /// negation of a positive one.
    pub negative_numbers: bool,

    /// Absolute tolerance, used for `=` and for comparisons of values near zero.
    pub abs_tol: f64,

    /// Relative tolerance used by [`Options::number_cmp`].
    pub rel_tol: f64,

    /// Compare values by relative error when they are not near zero.
    pub use_rel_err: bool,

    /// Flatten every parsed formula into sums and products.
    pub flatten_on_parse: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            negative_numbers: true,
            abs_tol: 1e-8,
            rel_tol: 1e-4,
            use_rel_err: true,
            flatten_on_parse: false,
        }
    }
}

impl Options {
    /// Compares two values approximately, returning [`Ordering::Equal`] when they agree within
    /// tolerance.
    ///
    /// Relative error is used unless `use_rel_err` is off or `a` is within the absolute tolerance
    /// of zero.
    pub fn number_cmp(&self, a: f64, b: f64) -> Ordering {
        let close = if !self.use_rel_err || a.abs() < self.abs_tol {
            (b - a).abs() < self.abs_tol
        } else {
            (b - a).abs() / a.abs() < self.rel_tol
        };

        if close {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn relative_and_absolute() {
        let options = Options::default();
        assert_eq!(options.number_cmp(1000.0, 1000.05), Ordering::Equal);
        assert_eq!(options.number_cmp(1000.0, 1001.0), Ordering::Less);
        assert_eq!(options.number_cmp(0.0, 1e-9), Ordering::Equal);
        assert_eq!(options.number_cmp(0.0, 1e-3), Ordering::Less);

        let absolute = Options { use_rel_err: false, ..options };
        assert_eq!(absolute.number_cmp(1000.0, 1000.05), Ordering::Less);
        assert_eq!(absolute.number_cmp(2.0, 1.0), Ordering::Greater);
    }
}
