//! Domain layer: Core business types and rules.
//!
//! Pure functions over primitive values: BMI derivation and classification,
//! charge brackets, currency conversion and advisory text. No I/O.

mod advisory;
pub mod bmi;
mod estimate;
pub mod money;
mod patient;

pub use advisory::{health_advisory, Advisory, AdvisoryTopic};
pub use bmi::{compute_bmi, BmiCategory, BmiSource, Severity, DEFAULT_BMI};
pub use estimate::{
    classify_charge_bracket, convert_currency, BracketThresholds, ChargeBracket, ChargeEstimate,
    ConvertedAmount, Currency, ExchangeRates, PREMIUM_REFERENCE, SOURCE_CURRENCY_SYMBOL,
};
pub use patient::{
    BmiInput, EstimateRequest, PatientProfile, Region, Sex, Smoker, AGE_RANGE, BMI_RANGE,
    CHILDREN_RANGE, DEFAULT_AGE, DEFAULT_CHILDREN, MIN_HEIGHT_M,
};
