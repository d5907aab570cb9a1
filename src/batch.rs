//! Batch scoring of customer profiles from CSV.
//!
//! Reads a profiles CSV, validates every row, scores each profile through
//! the same encode/infer/interpret path as a single analysis, and writes
//! the input back with prediction columns appended. Columns beyond the
//! required ten (a customer id, say) pass through untouched.

use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use tracing::info;

use crate::interpret::ChurnTier;
use crate::model::ModelBundle;
use crate::profile::{premium_from_str, CustomerProfile};

/// Input columns a profiles CSV must carry, in any order. `is_premium`
/// holds Yes/No, the categorical columns hold the form vocabulary.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "days_since_last_purchase",
    "account_age_days",
    "country",
    "age",
    "gender",
    "device",
    "category",
    "total_orders",
    "total_spent",
    "is_premium",
];

/// Tally of one batch run, kept for the console summary and the
/// distribution plots.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub rows: usize,
    /// Scored customers per segment label, indexed by label.
    pub segment_counts: Vec<usize>,
    /// Scored customers per churn tier: Low, Medium, High.
    pub tier_counts: [usize; 3],
    /// Churn percentage of every scored row, in input order.
    pub churn_pcts: Vec<f64>,
}

/// Score every row of `input` with the bundle and write the scored frame
/// to `output`. Any invalid row fails the whole run with its row number.
pub fn score_csv(bundle: &ModelBundle, input: &Path, output: &Path) -> Result<BatchSummary> {
    let mut df = read_profiles_frame(input)?;
    let profiles = parse_profiles(&df)
        .with_context(|| format!("invalid profiles in {}", input.display()))?;

    let n = profiles.len();
    let mut segment_labels: Vec<u32> = Vec::with_capacity(n);
    let mut segment_names: Vec<&str> = Vec::with_capacity(n);
    let mut badge_classes: Vec<&str> = Vec::with_capacity(n);
    let mut churn_pcts: Vec<f64> = Vec::with_capacity(n);
    let mut tier_labels: Vec<&str> = Vec::with_capacity(n);

    let mut segment_counts = vec![0usize; bundle.segment.n_clusters()];
    let mut tier_counts = [0usize; 3];

    for profile in &profiles {
        let prediction = bundle.analyze(profile)?;
        segment_counts[prediction.segment_label] += 1;
        tier_counts[tier_index(prediction.tier)] += 1;

        segment_labels.push(prediction.segment_label as u32);
        segment_names.push(prediction.segment.name);
        badge_classes.push(prediction.segment.badge.as_str());
        churn_pcts.push(prediction.churn_pct);
        tier_labels.push(prediction.tier.label());
    }

    df.with_column(Series::new("segment_label", segment_labels))?;
    df.with_column(Series::new("segment_name", segment_names))?;
    df.with_column(Series::new("badge_class", badge_classes))?;
    df.with_column(Series::new("churn_pct", churn_pcts.clone()))?;
    df.with_column(Series::new("churn_tier", tier_labels))?;

    write_scored_frame(&mut df, output)?;
    info!(rows = n, output = %output.display(), "batch scoring complete");

    Ok(BatchSummary {
        rows: n,
        segment_counts,
        tier_counts,
        churn_pcts,
    })
}

fn tier_index(tier: ChurnTier) -> usize {
    match tier {
        ChurnTier::Low => 0,
        ChurnTier::Medium => 1,
        ChurnTier::High => 2,
    }
}

fn read_profiles_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(df)
}

fn write_scored_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Raw cell values per column; parsing stays row-oriented so errors can
/// carry a row number.
struct RawColumns {
    days: Vec<Option<f64>>,
    account_age: Vec<Option<f64>>,
    country: Vec<Option<String>>,
    age: Vec<Option<f64>>,
    gender: Vec<Option<String>>,
    device: Vec<Option<String>>,
    category: Vec<Option<String>>,
    orders: Vec<Option<f64>>,
    spent: Vec<Option<f64>>,
    premium: Vec<Option<String>>,
}

fn parse_profiles(df: &DataFrame) -> Result<Vec<CustomerProfile>> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            bail!("missing required column '{}'", name);
        }
    }
    if df.height() == 0 {
        bail!("no data rows");
    }

    let columns = RawColumns {
        days: numeric_column(df, "days_since_last_purchase")?,
        account_age: numeric_column(df, "account_age_days")?,
        country: text_column(df, "country")?,
        age: numeric_column(df, "age")?,
        gender: text_column(df, "gender")?,
        device: text_column(df, "device")?,
        category: text_column(df, "category")?,
        orders: numeric_column(df, "total_orders")?,
        spent: numeric_column(df, "total_spent")?,
        premium: text_column(df, "is_premium")?,
    };

    let mut profiles = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        // data rows count from 1, the header is not a row
        let profile =
            build_profile(&columns, row).with_context(|| format!("row {}", row + 1))?;
        profiles.push(profile);
    }
    Ok(profiles)
}

fn build_profile(columns: &RawColumns, row: usize) -> Result<CustomerProfile> {
    let profile = CustomerProfile {
        days_since_last_purchase: require_integer(
            columns.days[row],
            "days_since_last_purchase",
        )?,
        account_age_days: require_integer(columns.account_age[row], "account_age_days")?,
        country: require_text(&columns.country[row], "country")?.parse()?,
        age: require_integer(columns.age[row], "age")?,
        gender: require_text(&columns.gender[row], "gender")?.parse()?,
        device: require_text(&columns.device[row], "device")?.parse()?,
        category: require_text(&columns.category[row], "category")?.parse()?,
        total_orders: require_integer(columns.orders[row], "total_orders")?,
        total_spent: require_float(columns.spent[row], "total_spent")?,
        is_premium: premium_from_str(require_text(&columns.premium[row], "is_premium")?)?,
    };
    profile.validate()?;
    Ok(profile)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("column '{}' is not numeric", name))?;
    Ok(series.f64()?.into_iter().collect())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let utf8 = df
        .column(name)?
        .utf8()
        .with_context(|| format!("column '{}' is not text", name))?;
    Ok(utf8.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn require_text<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("{} is missing", name))
}

fn require_float(value: Option<f64>, name: &str) -> Result<f64> {
    value.with_context(|| format!("{} is missing or not numeric", name))
}

fn require_integer(value: Option<f64>, name: &str) -> Result<u32> {
    let value = value.with_context(|| format!("{} is missing or not numeric", name))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        bail!("{} must be a non-negative integer, got {}", name, value);
    }
    if value > f64::from(u32::MAX) {
        bail!("{} is out of range, got {}", name, value);
    }
    Ok(value as u32)
}
