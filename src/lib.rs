//! # Medcharge
//!
//! Medical insurance charge estimation from a pre-trained random-forest model.
//!
//! This crate provides:
//! - BMI derivation and WHO classification
//! - Charge bracket classification and currency conversion
//! - Static health advisories
//! - Terminal UI for entering a patient profile
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types and rules (PatientProfile, BmiCategory, ChargeEstimate)
//! - `ports`: Trait definitions for external collaborators (the charge model)
//! - `adapters`: Concrete implementations (JSON random forest, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{BmiCategory, ChargeBracket, ChargeEstimate, PatientProfile};

/// Result type for Medcharge operations
pub type Result<T> = std::result::Result<T, MedchargeError>;

/// Main error type for Medcharge
#[derive(Debug, thiserror::Error)]
pub enum MedchargeError {
    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid patient data: {0}")]
    Validation(String),
}
