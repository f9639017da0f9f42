//! Ports layer: Trait definitions for external collaborators.
//!
//! The only boundary the estimator crosses is the pre-trained charge model.

mod charge_model;

pub use charge_model::{ChargeModel, ModelError};
