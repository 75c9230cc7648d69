//! How the value of a parameter is chosen.

/// The way a parameter gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterMode {
    /// A value drawn from `min, min + by, min + 2 by, ...` up to `max`. With `nonzero`, values
    /// within the absolute tolerance of zero are redrawn.
    Random {
        min: f64,
        max: f64,
        by: f64,
        nonzero: bool,
    },

    /// The value of a constant formula, which may use the parameters defined before it.
    Calculate { formula: String },

    /// An exact fraction.
    Rational { numer: i64, denom: i64 },

    /// A fixed value.
    Static { value: f64 },
}

/// The definition of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// How the value is chosen.
    pub mode: ParameterMode,

    /// If set, the value is rounded to a multiple of this precision.
    pub prec: Option<f64>,
}

impl ParameterSpec {
    /// A random value from a discrete range.
    pub fn random(min: f64, max: f64, by: f64) -> Self {
        Self {
            mode: ParameterMode::Random { min, max, by, nonzero: false },
            prec: None,
        }
    }

    /// A random nonzero value from a discrete range.
    pub fn random_nonzero(min: f64, max: f64, by: f64) -> Self {
        Self {
            mode: ParameterMode::Random { min, max, by, nonzero: true },
            prec: None,
        }
    }

    /// The value of a formula.
    pub fn calculate(formula: &str) -> Self {
        Self {
            mode: ParameterMode::Calculate { formula: formula.to_string() },
            prec: None,
        }
    }

    /// An exact fraction.
    pub fn rational(numer: i64, denom: i64) -> Self {
        Self { mode: ParameterMode::Rational { numer, denom }, prec: None }
    }

    /// A fixed value.
    pub fn fixed(value: f64) -> Self {
        Self { mode: ParameterMode::Static { value }, prec: None }
    }

    /// Rounds the value to a multiple of `prec`.
    pub fn with_prec(mut self, prec: f64) -> Self {
        self.prec = Some(prec);
        self
    }
}

/// Rounds a value to the given precision.
pub(crate) fn round_to(value: f64, prec: f64) -> f64 {
    (value / prec).round() / (1.0 / prec).round()
}
