//! Patient attributes accepted by the charge model.
//!
//! Mirrors the six columns the model was trained on: age, sex, bmi, children,
//! smoker and region. Categorical values keep their raw training spellings
//! (`"Male"`, `"Yes"`, `"southeast"`) so the model adapter can encode them.

use serde::{Deserialize, Serialize};

use super::bmi::{compute_bmi, BmiSource, DEFAULT_BMI};

/// Default age shown on a fresh form.
pub const DEFAULT_AGE: u8 = 30;

/// Default number of children shown on a fresh form.
pub const DEFAULT_CHILDREN: u8 = 0;

pub const AGE_RANGE: (u8, u8) = (0, 100);
pub const CHILDREN_RANGE: (u8, u8) = (0, 10);
pub const BMI_RANGE: (f64, f64) = (10.0, 60.0);

/// Heights at or below this are rejected at the input boundary (meters).
pub const MIN_HEIGHT_M: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Smoker {
    Yes,
    No,
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    #[must_use]
    pub fn is_smoker(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Northeast => "northeast",
            Self::Northwest => "northwest",
            Self::Southeast => "southeast",
            Self::Southwest => "southwest",
        }
    }
}

macro_rules! impl_display_from_str {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                        .ok_or_else(|| format!("Unknown {} value: {s:?}", stringify!($ty)))
                }
            }
        )*
    };
}

impl_display_from_str!(Sex, Smoker, Region);

/// How the patient supplies their BMI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BmiInput {
    /// The patient knows their BMI.
    Known(f64),
    /// Derive from weight (kg) and height (m). Height may still be missing.
    Measured { weight_kg: f64, height_m: Option<f64> },
}

impl BmiInput {
    /// Resolve to a concrete BMI, falling back to [`DEFAULT_BMI`] when the
    /// height is missing or unusable.
    #[must_use]
    pub fn resolve(&self) -> (f64, BmiSource) {
        match *self {
            Self::Known(bmi) => (bmi, BmiSource::Entered),
            Self::Measured { weight_kg, height_m } => {
                match height_m.and_then(|h| compute_bmi(weight_kg, h)) {
                    Some(bmi) => (bmi, BmiSource::Calculated),
                    None => (DEFAULT_BMI, BmiSource::Defaulted),
                }
            }
        }
    }
}

impl Default for BmiInput {
    fn default() -> Self {
        Self::Known(DEFAULT_BMI)
    }
}

/// Raw form submission, validated before it becomes a [`PatientProfile`].
///
/// Counts are wider than the profile's so that out-of-range entries reach
/// [`EstimateRequest::validate`] instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub age: u32,
    pub sex: Sex,
    pub bmi: BmiInput,
    pub children: u32,
    pub smoker: Smoker,
    pub region: Region,
}

impl Default for EstimateRequest {
    fn default() -> Self {
        Self {
            age: u32::from(DEFAULT_AGE),
            sex: Sex::Male,
            bmi: BmiInput::default(),
            children: u32::from(DEFAULT_CHILDREN),
            smoker: Smoker::Yes,
            region: Region::Northeast,
        }
    }
}

impl EstimateRequest {
    /// Check every numeric field against the input boundary ranges.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(u32::from(AGE_RANGE.0)..=u32::from(AGE_RANGE.1)).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        if !(u32::from(CHILDREN_RANGE.0)..=u32::from(CHILDREN_RANGE.1)).contains(&self.children) {
            errors.push(format!(
                "Children {} out of range [{}, {}]",
                self.children, CHILDREN_RANGE.0, CHILDREN_RANGE.1
            ));
        }

        match self.bmi {
            BmiInput::Known(bmi) => {
                if !(BMI_RANGE.0..=BMI_RANGE.1).contains(&bmi) {
                    errors.push(format!(
                        "BMI {} out of range [{}, {}]",
                        bmi, BMI_RANGE.0, BMI_RANGE.1
                    ));
                }
            }
            BmiInput::Measured { weight_kg, height_m } => {
                if !(weight_kg.is_finite() && weight_kg > 0.0) {
                    errors.push(format!("Weight {weight_kg} must be greater than 0"));
                }
                if let Some(h) = height_m {
                    if !(h.is_finite() && h > MIN_HEIGHT_M) {
                        errors.push(format!("Height {h} must be greater than {MIN_HEIGHT_M}"));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve the BMI and freeze the request into a profile.
    ///
    /// Expects a validated request; counts beyond `u8` saturate.
    #[must_use]
    pub fn into_profile(self) -> (PatientProfile, BmiSource) {
        let (bmi, source) = self.bmi.resolve();
        let profile = PatientProfile {
            age: u8::try_from(self.age).unwrap_or(u8::MAX),
            sex: self.sex,
            bmi,
            children: u8::try_from(self.children).unwrap_or(u8::MAX),
            smoker: self.smoker,
            region: self.region,
        };
        (profile, source)
    }
}

/// The six attributes handed to the charge model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u8,
    pub sex: Sex,
    pub bmi: f64,
    pub children: u8,
    pub smoker: Smoker,
    pub region: Region,
}
