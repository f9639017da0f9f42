//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use case of the application: estimating a charge.

mod estimator;

pub use estimator::EstimationService;
