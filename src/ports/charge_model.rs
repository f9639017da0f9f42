//! Charge model port: Trait for the pre-trained regression model.
//!
//! The estimator never looks inside the model. It hands over one profile and
//! receives one predicted charge in the source currency.

use crate::domain::PatientProfile;

/// Errors raised while loading or querying a charge model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),

    #[error("Unsupported feature column: {0}")]
    UnsupportedFeature(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Trait for charge prediction.
///
/// Implementations must be deterministic for a given profile.
pub trait ChargeModel: Send + Sync {
    /// Predict the insurance charge for a single profile.
    ///
    /// # Errors
    /// Returns `ModelError::Prediction` if the model cannot produce a finite value.
    fn predict(&self, profile: &PatientProfile) -> Result<f64, ModelError>;

    /// Short human-readable description (shown in the UI header).
    fn describe(&self) -> String;
}
