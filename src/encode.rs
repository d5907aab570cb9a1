//! Feature encoding: customer profile to model-ready numeric vectors.
//!
//! The column order below is the order the models were trained on. It is a
//! hard contract: reordering produces silently wrong predictions, not a
//! runtime error. Both vectors share the first eleven columns; the
//! segmentation vector carries one extra trailing column that is always 0
//! because the segment model was trained with an unused placeholder column.

use ndarray::Array1;

use crate::profile::CustomerProfile;

/// Width of the churn classifier input.
pub const CHURN_FEATURES: usize = 11;

/// Width of the segmentation model input (churn features plus placeholder).
pub const SEGMENT_FEATURES: usize = CHURN_FEATURES + 1;

/// Churn feature names, in vector order. Used for diagnostics and artifact
/// sanity reporting, never for reordering.
pub const CHURN_FEATURE_NAMES: [&str; CHURN_FEATURES] = [
    "days_since_last_purchase",
    "account_age_days",
    "country",
    "age",
    "gender",
    "device",
    "category",
    "total_orders",
    "total_spent",
    "avg_order_value",
    "is_premium",
];

/// Encode the churn classifier input for one profile.
///
/// Pure and total: every enum variant has a fixed code and no field can be
/// out of vocabulary once a `CustomerProfile` exists.
pub fn churn_vector(profile: &CustomerProfile) -> Array1<f64> {
    Array1::from_vec(vec![
        f64::from(profile.days_since_last_purchase),
        f64::from(profile.account_age_days),
        f64::from(profile.country.code()),
        f64::from(profile.age),
        f64::from(profile.gender.code()),
        f64::from(profile.device.code()),
        f64::from(profile.category.code()),
        f64::from(profile.total_orders),
        profile.total_spent,
        profile.avg_order_value(),
        if profile.is_premium { 1.0 } else { 0.0 },
    ])
}

/// Encode the segmentation model input: the churn vector plus the trailing
/// placeholder column.
pub fn segment_vector(profile: &CustomerProfile) -> Array1<f64> {
    let mut values = churn_vector(profile).into_raw_vec();
    values.push(0.0);
    Array1::from_vec(values)
}
