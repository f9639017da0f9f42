//! Adapters layer: Concrete implementations of ports.
//!
//! - `forest`: random-forest charge model loaded from a JSON artifact
//! - `sanitize`: patient-attribute filtering for logs

pub mod forest;
pub mod sanitize;

pub use forest::ForestModel;
