//! Estimation service: Orchestrates one charge estimate.
//!
//! This service coordinates:
//! - Input validation at the boundary
//! - BMI resolution (entered, calculated or defaulted)
//! - Model prediction
//! - Bracket, currency and advisory derivation

use std::sync::Arc;

use crate::config::EstimatorConfig;
use crate::domain::{ChargeEstimate, EstimateRequest};
use crate::ports::ChargeModel;
use crate::MedchargeError;

/// Service for running charge estimates against a model.
pub struct EstimationService<M>
where
    M: ChargeModel,
{
    model: Arc<M>,
    config: EstimatorConfig,
}

impl<M> EstimationService<M>
where
    M: ChargeModel,
{
    /// Create a new estimation service.
    pub fn new(model: Arc<M>, config: EstimatorConfig) -> Self {
        Self { model, config }
    }

    #[must_use]
    pub fn model_description(&self) -> String {
        self.model.describe()
    }

    /// Run a single estimate.
    ///
    /// # Errors
    /// Returns `MedchargeError::Validation` for out-of-range input and
    /// `MedchargeError::Model` if the model cannot produce a prediction.
    pub fn estimate(&self, request: EstimateRequest) -> Result<ChargeEstimate, MedchargeError> {
        request
            .validate()
            .map_err(|errors| MedchargeError::Validation(errors.join(", ")))?;

        let (profile, bmi_source) = request.into_profile();
        tracing::debug!(?bmi_source, "Resolved BMI");

        let amount = self.model.predict(&profile)?;

        let estimate = ChargeEstimate::from_prediction(
            profile,
            bmi_source,
            amount,
            &self.config.rates,
            &self.config.thresholds,
        );

        tracing::info!(
            "Estimate complete: bracket={}, advisories={}",
            estimate.bracket,
            estimate.advisories.len()
        );

        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BmiCategory, BmiInput, BmiSource, ChargeBracket, Currency, PatientProfile, Smoker,
    };
    use crate::ports::ModelError;
    use std::sync::Mutex;

    /// Returns a fixed amount and remembers the last profile it saw.
    struct FixedModel {
        amount: f64,
        seen: Mutex<Option<PatientProfile>>,
    }

    impl FixedModel {
        fn new(amount: f64) -> Self {
            Self {
                amount,
                seen: Mutex::new(None),
            }
        }
    }

    impl ChargeModel for FixedModel {
        fn predict(&self, profile: &PatientProfile) -> Result<f64, ModelError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(*profile);
            }
            if self.amount.is_finite() {
                Ok(self.amount)
            } else {
                Err(ModelError::Prediction("non-finite".into()))
            }
        }

        fn describe(&self) -> String {
            "fixed".into()
        }
    }

    fn service(amount: f64) -> (EstimationService<FixedModel>, Arc<FixedModel>) {
        let model = Arc::new(FixedModel::new(amount));
        (
            EstimationService::new(model.clone(), EstimatorConfig::default()),
            model,
        )
    }

    #[test]
    fn test_estimate_with_calculated_bmi() {
        let (service, model) = service(15_400.0);
        let request = EstimateRequest {
            bmi: BmiInput::Measured {
                weight_kg: 65.0,
                height_m: Some(1.75),
            },
            smoker: Smoker::No,
            ..Default::default()
        };

        let estimate = service.estimate(request).expect("estimate");
        assert_eq!(estimate.bmi_source, BmiSource::Calculated);
        assert_eq!(estimate.bmi_category, BmiCategory::Normal);
        assert_eq!(estimate.bracket, ChargeBracket::Low);
        assert_eq!(estimate.advisories.len(), 1);
        let usd = estimate.conversion(Currency::Usd).expect("usd");
        assert!((usd.amount - 10.0).abs() < f64::EPSILON);

        let seen = (*model.seen.lock().expect("lock")).expect("model was queried");
        assert!((seen.bmi - 21.22).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_with_missing_height_defaults_bmi() {
        let (service, _) = service(52_000.0);
        let request = EstimateRequest {
            bmi: BmiInput::Measured {
                weight_kg: 80.0,
                height_m: None,
            },
            ..Default::default()
        };

        let estimate = service.estimate(request).expect("estimate");
        assert_eq!(estimate.bmi_source, BmiSource::Defaulted);
        assert!((estimate.profile.bmi - 25.0).abs() < f64::EPSILON);
        assert_eq!(estimate.bracket, ChargeBracket::High);
        // Default request is a smoker.
        assert_eq!(estimate.advisories.len(), 2);
    }

    #[test]
    fn test_invalid_request_never_reaches_model() {
        let (service, model) = service(1.0);
        let request = EstimateRequest {
            age: 120,
            ..Default::default()
        };

        let err = service.estimate(request).unwrap_err();
        assert!(matches!(err, MedchargeError::Validation(_)));
        assert!(model.seen.lock().expect("lock").is_none());
    }

    #[test]
    fn test_model_failure_is_surfaced() {
        let (service, _) = service(f64::NAN);
        let err = service.estimate(EstimateRequest::default()).unwrap_err();
        assert!(matches!(err, MedchargeError::Model(ModelError::Prediction(_))));
    }
}
