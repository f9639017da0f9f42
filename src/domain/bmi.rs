//! Body-mass index derivation and WHO classification.

use serde::{Deserialize, Serialize};

/// BMI used when it cannot be derived (no usable height yet).
pub const DEFAULT_BMI: f64 = 25.0;

/// Round to two decimal places.
///
/// Rounds the exact binary value, ties to even (`6.125` becomes `6.12`).
/// Scaling by 100 first would round an inexact product instead.
#[must_use]
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Compute BMI from weight (kg) and height (m), rounded to two decimals.
///
/// Returns `None` when the height is not strictly positive (or either input is
/// not finite). Callers treat `None` as "BMI unavailable" and fall back to
/// [`DEFAULT_BMI`].
#[must_use]
pub fn compute_bmi(weight_kg: f64, height_m: f64) -> Option<f64> {
    if !weight_kg.is_finite() || !height_m.is_finite() || height_m <= 0.0 {
        return None;
    }
    Some(round2(weight_kg / (height_m * height_m)))
}

/// Where the BMI of an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiSource {
    /// Typed in directly by the patient
    Entered,
    /// Derived from weight and height
    Calculated,
    /// Height unavailable, default substituted
    Defaulted,
}

/// How loudly a classification should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Warning,
    Alert,
}

/// WHO BMI classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObeseI,
    ObeseII,
    ObeseIII,
}

impl BmiCategory {
    /// Classify a BMI value. Each band includes its lower bound.
    ///
    /// Total over all inputs: NaN falls through every comparison and lands in
    /// `ObeseIII`, matching a plain chain of `<` checks.
    #[must_use]
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else if bmi < 35.0 {
            Self::ObeseI
        } else if bmi < 40.0 {
            Self::ObeseII
        } else {
            Self::ObeseIII
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::ObeseI => "Obese Class I",
            Self::ObeseII => "Obese Class II",
            Self::ObeseIII => "Obese Class III",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Normal => Severity::Ok,
            Self::Underweight | Self::Overweight => Severity::Warning,
            Self::ObeseI | Self::ObeseII | Self::ObeseIII => Severity::Alert,
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
