//! Charge estimate types: brackets, currency conversion and the assembled result.

use serde::{Deserialize, Serialize};

use super::advisory::{health_advisory, Advisory};
use super::bmi::{round2, BmiCategory, BmiSource};
use super::money::format_money;
use super::patient::PatientProfile;

/// Lower bound (inclusive) of the mid bracket, in the source currency.
pub const DEFAULT_MID_BRACKET_FLOOR: f64 = 20_000.0;

/// Lower bound (inclusive) of the high bracket, in the source currency.
pub const DEFAULT_HIGH_BRACKET_FLOOR: f64 = 50_000.0;

/// Coarse tier of a predicted charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeBracket {
    Low,
    Mid,
    High,
}

impl ChargeBracket {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low-cost / Basic",
            Self::Mid => "Entry to Mid-level",
            Self::High => "Comprehensive",
        }
    }

    /// One-line explanation shown under the estimate.
    #[must_use]
    pub fn insight(&self) -> &'static str {
        match self {
            Self::Low => "Your estimated premium falls in the low-cost/basic range.",
            Self::Mid => "Your estimated premium is in the entry to mid-level range.",
            Self::High => "Your estimated premium is in the comprehensive/high coverage range.",
        }
    }
}

impl std::fmt::Display for ChargeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Mid => write!(f, "MID"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Published premium ranges, shown next to the bracket.
pub const PREMIUM_REFERENCE: [(&str, &str); 3] = [
    (
        "₦3,500 – ₦20,000/year",
        "Basic/Low-cost (outpatient, telemedicine, essential care)",
    ),
    (
        "₦20,000 – ₦50,000/year",
        "Entry to Mid-level (some inpatient, emergency, diagnostics)",
    ),
    (
        "₦50,000 – ₦150,000+/year",
        "Comprehensive (inpatient, surgeries, maternity, specialist care)",
    ),
];

/// Bracket boundaries. Each bracket includes its floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketThresholds {
    pub mid_floor: f64,
    pub high_floor: f64,
}

impl Default for BracketThresholds {
    fn default() -> Self {
        Self {
            mid_floor: DEFAULT_MID_BRACKET_FLOOR,
            high_floor: DEFAULT_HIGH_BRACKET_FLOOR,
        }
    }
}

impl BracketThresholds {
    #[must_use]
    pub fn classify(&self, amount: f64) -> ChargeBracket {
        if amount < self.mid_floor {
            ChargeBracket::Low
        } else if amount < self.high_floor {
            ChargeBracket::Mid
        } else {
            ChargeBracket::High
        }
    }
}

/// Classify an amount with the default thresholds.
#[must_use]
pub fn classify_charge_bracket(amount: f64) -> ChargeBracket {
    BracketThresholds::default().classify(amount)
}

/// Display currencies the estimate is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Gbp, Currency::Eur];

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Gbp => "£",
            Self::Eur => "€",
        }
    }
}

/// Symbol of the currency the model predicts in.
pub const SOURCE_CURRENCY_SYMBOL: &str = "₦";

/// Source-currency units per unit of each display currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub usd: f64,
    pub gbp: f64,
    pub eur: f64,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            usd: 1540.0,
            gbp: 2087.0,
            eur: 1802.0,
        }
    }
}

impl ExchangeRates {
    #[must_use]
    pub fn rate(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Gbp => self.gbp,
            Currency::Eur => self.eur,
        }
    }
}

/// Divide by a positive rate and round to two decimals.
#[must_use]
pub fn convert_currency(amount: f64, rate: f64) -> f64 {
    debug_assert!(rate > 0.0, "exchange rate must be positive");
    round2(amount / rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedAmount {
    pub currency: Currency,
    pub amount: f64,
}

impl ConvertedAmount {
    #[must_use]
    pub fn formatted(&self) -> String {
        format_money(self.currency.symbol(), self.amount)
    }
}

/// Complete estimate for one request.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeEstimate {
    /// Profile the model was queried with
    pub profile: PatientProfile,

    /// Raw model prediction in the source currency
    pub amount: f64,

    pub conversions: Vec<ConvertedAmount>,

    pub bracket: ChargeBracket,

    pub bmi_source: BmiSource,

    pub bmi_category: BmiCategory,

    pub advisories: Vec<Advisory>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChargeEstimate {
    /// Derive every display value from a model prediction.
    #[must_use]
    pub fn from_prediction(
        profile: PatientProfile,
        bmi_source: BmiSource,
        amount: f64,
        rates: &ExchangeRates,
        thresholds: &BracketThresholds,
    ) -> Self {
        let conversions = Currency::ALL
            .iter()
            .map(|&currency| ConvertedAmount {
                currency,
                amount: convert_currency(amount, rates.rate(currency)),
            })
            .collect();
        let bmi_category = BmiCategory::classify(profile.bmi);

        Self {
            profile,
            amount,
            conversions,
            bracket: thresholds.classify(amount),
            bmi_source,
            bmi_category,
            advisories: health_advisory(bmi_category, profile.smoker.is_smoker()),
            created_at: chrono::Utc::now(),
        }
    }

    /// Primary amount, e.g. `₦12,345.67`.
    #[must_use]
    pub fn formatted_amount(&self) -> String {
        format_money(SOURCE_CURRENCY_SYMBOL, self.amount)
    }

    #[must_use]
    pub fn conversion(&self, currency: Currency) -> Option<&ConvertedAmount> {
        self.conversions.iter().find(|c| c.currency == currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::{Region, Sex, Smoker};

    fn profile(bmi: f64, smoker: Smoker) -> PatientProfile {
        PatientProfile {
            age: 42,
            sex: Sex::Female,
            bmi,
            children: 2,
            smoker,
            region: Region::Southeast,
        }
    }

    #[test]
    fn test_bracket_boundaries() {
        assert_eq!(classify_charge_bracket(0.0), ChargeBracket::Low);
        assert_eq!(classify_charge_bracket(19_999.99), ChargeBracket::Low);
        assert_eq!(classify_charge_bracket(20_000.0), ChargeBracket::Mid);
        assert_eq!(classify_charge_bracket(49_999.99), ChargeBracket::Mid);
        assert_eq!(classify_charge_bracket(50_000.0), ChargeBracket::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = BracketThresholds {
            mid_floor: 100.0,
            high_floor: 200.0,
        };
        assert_eq!(thresholds.classify(99.0), ChargeBracket::Low);
        assert_eq!(thresholds.classify(150.0), ChargeBracket::Mid);
        assert_eq!(thresholds.classify(200.0), ChargeBracket::High);
    }

    #[test]
    fn test_convert_currency() {
        assert!((convert_currency(1540.0, 1540.0) - 1.0).abs() < f64::EPSILON);
        assert!((convert_currency(10_000.0, 2087.0) - 4.79).abs() < 1e-9);
        assert!((convert_currency(10_000.0, 1802.0) - 5.55).abs() < 1e-9);
    }

    #[test]
    fn test_convert_currency_rounds_exact_quotient() {
        // 46839.1 / 1540 is stored just below 30.415.
        assert_eq!(convert_currency(46_839.1, 1540.0), 30.41);
        assert_eq!(convert_currency(30_800.0, 1540.0), 20.0);
    }

    #[test]
    fn test_estimate_from_prediction() {
        let estimate = ChargeEstimate::from_prediction(
            profile(31.2, Smoker::Yes),
            BmiSource::Entered,
            30_800.0,
            &ExchangeRates::default(),
            &BracketThresholds::default(),
        );

        assert_eq!(estimate.bracket, ChargeBracket::Mid);
        assert_eq!(estimate.bmi_category, BmiCategory::ObeseI);
        assert_eq!(estimate.conversions.len(), 3);
        let usd = estimate.conversion(Currency::Usd).expect("usd conversion");
        assert!((usd.amount - 20.0).abs() < f64::EPSILON);
        assert_eq!(usd.formatted(), "$20.00");
        assert_eq!(estimate.formatted_amount(), "₦30,800.00");
        assert_eq!(estimate.advisories.len(), 2);
    }
}
