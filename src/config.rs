//! Runtime configuration from environment variables.
//!
//! | Variable                             | Default  |
//! |--------------------------------------|----------|
//! | `MEDCHARGE_MODEL_PATH`               | `models` |
//! | `MEDCHARGE_REQUIRE_MODEL_MANIFEST`   | `false`  |
//! | `MEDCHARGE_USD_RATE`                 | `1540`   |
//! | `MEDCHARGE_GBP_RATE`                 | `2087`   |
//! | `MEDCHARGE_EUR_RATE`                 | `1802`   |
//! | `MEDCHARGE_MID_BRACKET_FLOOR`        | `20000`  |
//! | `MEDCHARGE_HIGH_BRACKET_FLOOR`       | `50000`  |

use std::path::PathBuf;

use crate::domain::{BracketThresholds, ExchangeRates};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not a number: {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be a finite positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("mid bracket floor {mid} must be below high bracket floor {high}")]
    BracketOrder { mid: f64, high: f64 },
}

/// Settings shared by the estimation service and the TUI.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub model_path: PathBuf,
    pub require_manifest: bool,
    pub rates: ExchangeRates,
    pub thresholds: BracketThresholds,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            require_manifest: false,
            rates: ExchangeRates::default(),
            thresholds: BracketThresholds::default(),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl EstimatorConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a numeric variable is malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError` if a numeric variable is malformed or out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let number = |name: &'static str, default: f64| -> Result<f64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| ConfigError::NotANumber {
                    name,
                    value: raw,
                }),
            }
        };
        let positive = |name: &'static str, default: f64| -> Result<f64, ConfigError> {
            let value = number(name, default)?;
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(ConfigError::NotPositive { name, value })
            }
        };

        let rates = ExchangeRates {
            usd: positive("MEDCHARGE_USD_RATE", defaults.rates.usd)?,
            gbp: positive("MEDCHARGE_GBP_RATE", defaults.rates.gbp)?,
            eur: positive("MEDCHARGE_EUR_RATE", defaults.rates.eur)?,
        };

        let thresholds = BracketThresholds {
            mid_floor: positive("MEDCHARGE_MID_BRACKET_FLOOR", defaults.thresholds.mid_floor)?,
            high_floor: positive("MEDCHARGE_HIGH_BRACKET_FLOOR", defaults.thresholds.high_floor)?,
        };
        if thresholds.mid_floor >= thresholds.high_floor {
            return Err(ConfigError::BracketOrder {
                mid: thresholds.mid_floor,
                high: thresholds.high_floor,
            });
        }

        Ok(Self {
            model_path: lookup("MEDCHARGE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            require_manifest: lookup("MEDCHARGE_REQUIRE_MODEL_MANIFEST")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            rates,
            thresholds,
        })
    }
}
