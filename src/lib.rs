//! ChurnRadar: churn risk scoring and customer segmentation from
//! pre-trained models.
//!
//! This library encodes a customer profile into the feature layout the
//! models were trained on, runs two pre-trained artifacts (a boosted-tree
//! churn classifier and a K-Means segmenter) and interprets the raw
//! outputs into a named segment and a churn risk tier.

pub mod batch;
pub mod cli;
pub mod encode;
pub mod interpret;
pub mod model;
pub mod profile;
pub mod report;
pub mod viz;

// Re-export public items for easier access
pub use interpret::{segment_info, ChurnTier, Prediction};
pub use model::{ModelBundle, ModelUnavailable};
pub use profile::CustomerProfile;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
