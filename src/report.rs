//! Rendering of analysis results: console card, machine-readable JSON
//! report, and the model inspection listing.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interpret::Prediction;
use crate::model::{ArtifactMeta, ModelBundle, CHURN_MODEL_FILE, SCALER_FILE, SEGMENT_MODEL_FILE};
use crate::profile::CustomerProfile;

/// Console card for one analysis result.
pub fn format_card(prediction: &Prediction) -> String {
    let mut out = String::new();
    out.push_str("=== Customer Segment ===\n");
    out.push_str(&format!(
        "{} [{}]\n",
        prediction.segment.name, prediction.segment.badge
    ));
    out.push_str("\n=== Churn Risk Prediction ===\n");
    out.push_str(&format!(
        "{:.0}% {}\n",
        prediction.churn_pct,
        prediction.tier.label()
    ));
    out.push_str(&format!("\"{}\"\n", prediction.tier.description()));
    out
}

/// Listing of the loaded artifacts for the `models` subcommand.
pub fn format_models(bundle: &ModelBundle) -> String {
    let mut out = String::new();
    out.push_str("=== Model Bundle ===\n");
    out.push_str(&format!(
        "{}: {} trees, {} features{}\n",
        CHURN_MODEL_FILE,
        bundle.churn.trees.len(),
        bundle.churn.n_features,
        describe_meta(&bundle.churn.meta)
    ));
    out.push_str(&format!(
        "{}: {} centroids, {} features{}\n",
        SEGMENT_MODEL_FILE,
        bundle.segment.n_clusters(),
        bundle.segment.n_features(),
        describe_meta(&bundle.segment.meta)
    ));
    out.push_str(&format!(
        "{}: {} features{}\n",
        SCALER_FILE,
        bundle.scaler.width(),
        describe_meta(&bundle.scaler.meta)
    ));
    out.push_str(
        "\nNote: scaler parameters are loaded for compatibility checks only;\n\
         the models consume unscaled features.\n",
    );
    out
}

fn describe_meta(meta: &ArtifactMeta) -> String {
    let mut parts = Vec::new();
    if let Some(algorithm) = &meta.algorithm {
        parts.push(algorithm.clone());
    }
    if let Some(version) = &meta.version {
        parts.push(format!("v{}", version));
    }
    if let Some(trained_at) = meta.trained_at {
        parts.push(format!("trained {}", trained_at.format("%Y-%m-%d")));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

/// Machine-readable record of one analysis: the echoed input alongside both
/// model verdicts, stamped with tool provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub profile: CustomerProfile,
    pub segment: SegmentReport,
    pub churn: ChurnReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentReport {
    pub label: usize,
    pub name: String,
    pub badge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnReport {
    pub probability_pct: f64,
    pub tier: String,
    pub description: String,
}

pub fn build_report(profile: &CustomerProfile, prediction: &Prediction) -> AnalysisReport {
    AnalysisReport {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: Utc::now(),
        profile: profile.clone(),
        segment: SegmentReport {
            label: prediction.segment_label,
            name: prediction.segment.name.to_string(),
            badge: prediction.segment.badge.as_str().to_string(),
        },
        churn: ChurnReport {
            probability_pct: prediction.churn_pct,
            tier: prediction.tier.label().to_string(),
            description: prediction.tier.description().to_string(),
        },
    }
}

pub fn write_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
