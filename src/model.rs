//! Pre-trained model artifacts: loading, validation, and inference.
//!
//! Three JSON artifacts ship together: a gradient-boosted churn classifier,
//! a K-Means segmentation model, and a standard scaler. Loading is
//! all-or-nothing; a [`ModelBundle`] that exists is ready for inference and
//! is never mutated afterwards, so it can be shared freely by reference.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::encode::{self, CHURN_FEATURES, SEGMENT_FEATURES};
use crate::interpret::Prediction;
use crate::profile::CustomerProfile;

pub const CHURN_MODEL_FILE: &str = "churn_model.json";
pub const SEGMENT_MODEL_FILE: &str = "segment_model.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Any of the three artifacts failed to load or validate. Analysis is
/// disabled until a complete bundle is available; nothing else about the
/// process breaks.
#[derive(Debug, Error)]
#[error("models unavailable: {reason}")]
pub struct ModelUnavailable {
    pub reason: String,
}

/// Optional provenance block carried by each artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactMeta {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

/// One node of a boosted regression tree, stored as a flat array with the
/// root at index 0. Child indices must point strictly forward in the array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("tree has no nodes");
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        bail!(
                            "node {}: feature index {} out of range (width {})",
                            idx,
                            feature,
                            n_features
                        );
                    }
                    if !threshold.is_finite() {
                        bail!("node {}: non-finite threshold", idx);
                    }
                    for child in [*left, *right] {
                        if child <= idx {
                            bail!("node {}: child index {} does not point forward", idx, child);
                        }
                        if child >= self.nodes.len() {
                            bail!("node {}: child index {} out of range", idx, child);
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        bail!("node {}: non-finite leaf value", idx);
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root; take the left branch when the feature value is
    /// strictly below the threshold. Forward-only child indices (checked at
    /// load time) guarantee the walk terminates.
    fn output(&self, features: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Gradient-boosted tree ensemble for binary churn classification.
///
/// The ensemble works in logit space: the churn probability is the sigmoid
/// of the bias plus the summed tree outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnModel {
    pub n_features: usize,
    pub bias: f64,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub meta: ArtifactMeta,
}

impl ChurnModel {
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            bail!("churn model declares zero features");
        }
        if !self.bias.is_finite() {
            bail!("churn model bias is not finite");
        }
        if self.trees.is_empty() {
            bail!("churn model has no trees");
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .with_context(|| format!("tree {}", i))?;
        }
        Ok(())
    }

    /// Probability of churn in [0, 1] for one encoded feature vector.
    pub fn predict_proba(&self, features: &Array1<f64>) -> Result<f64> {
        if features.len() != self.n_features {
            bail!(
                "churn model expects {} features, got {}",
                self.n_features,
                features.len()
            );
        }

        let mut margin = self.bias;
        for tree in &self.trees {
            margin += tree.output(features.view());
        }
        Ok(sigmoid(margin))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// On-disk form of the segmentation artifact: centroids as nested arrays,
/// the natural export shape on the training side.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SegmentModelFile {
    centroids: Vec<Vec<f64>>,
    #[serde(default)]
    meta: ArtifactMeta,
}

/// Centroid-based segmentation model.
#[derive(Debug, Clone)]
pub struct SegmentModel {
    centroids: Array2<f64>,
    pub meta: ArtifactMeta,
}

impl SegmentModel {
    /// Build a model from raw centroid rows, rejecting ragged or
    /// non-finite input.
    pub fn from_centroids(rows: Vec<Vec<f64>>, meta: ArtifactMeta) -> Result<Self> {
        if rows.is_empty() {
            bail!("segment model has no centroids");
        }
        let width = rows[0].len();
        if width == 0 {
            bail!("segment model centroids have zero width");
        }

        let mut flat = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                bail!("centroid {} has {} values, expected {}", i, row.len(), width);
            }
            for (j, value) in row.iter().enumerate() {
                if !value.is_finite() {
                    bail!("centroid {} value {} is not finite", i, j);
                }
            }
            flat.extend_from_slice(row);
        }

        let centroids = Array2::from_shape_vec((rows.len(), width), flat)?;
        Ok(SegmentModel { centroids, meta })
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.centroids.ncols()
    }

    /// Cluster label for one encoded feature vector.
    pub fn predict(&self, features: &Array1<f64>) -> Result<usize> {
        if features.len() != self.n_features() {
            bail!(
                "segment model expects {} features, got {}",
                self.n_features(),
                features.len()
            );
        }

        // Find nearest centroid; ties resolve to the lowest label
        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.outer_iter().enumerate() {
            let distance: f64 = features
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();

            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(closest_cluster)
    }
}

/// Standard-scaler parameters shipped alongside the models.
///
/// Loaded and width-checked for compatibility with the feature layout; the
/// trained models consume unscaled features, so the scaler is never applied
/// to either vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub meta: ArtifactMeta,
}

impl FeatureScaler {
    pub fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            bail!("scaler has no parameters");
        }
        if self.mean.len() != self.scale.len() {
            bail!(
                "scaler mean has {} values but scale has {}",
                self.mean.len(),
                self.scale.len()
            );
        }
        for value in self.mean.iter().chain(self.scale.iter()) {
            if !value.is_finite() {
                bail!("scaler contains a non-finite value");
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }
}

/// The three artifacts as one immutable unit.
///
/// Built once at startup and passed by reference into every request. All
/// fields are owned and never mutated after load, so a bundle is
/// `Send + Sync` and safe for concurrent read-only use.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub churn: ChurnModel,
    pub segment: SegmentModel,
    pub scaler: FeatureScaler,
}

impl ModelBundle {
    /// Load `churn_model.json`, `segment_model.json` and `scaler.json` from
    /// `dir`. Any missing or invalid artifact makes the whole bundle
    /// unavailable.
    pub fn load(dir: &Path) -> Result<Self, ModelUnavailable> {
        Self::try_load(dir).map_err(|err| ModelUnavailable {
            reason: format!("{:#}", err),
        })
    }

    fn try_load(dir: &Path) -> Result<Self> {
        let churn: ChurnModel = read_artifact(&dir.join(CHURN_MODEL_FILE))?;
        churn
            .validate()
            .with_context(|| format!("{} is invalid", CHURN_MODEL_FILE))?;

        let segment_file: SegmentModelFile = read_artifact(&dir.join(SEGMENT_MODEL_FILE))?;
        let segment = SegmentModel::from_centroids(segment_file.centroids, segment_file.meta)
            .with_context(|| format!("{} is invalid", SEGMENT_MODEL_FILE))?;

        let scaler: FeatureScaler = read_artifact(&dir.join(SCALER_FILE))?;
        scaler
            .validate()
            .with_context(|| format!("{} is invalid", SCALER_FILE))?;

        if churn.n_features != CHURN_FEATURES {
            bail!(
                "{} expects {} features but the encoder produces {}",
                CHURN_MODEL_FILE,
                churn.n_features,
                CHURN_FEATURES
            );
        }
        if segment.n_features() != SEGMENT_FEATURES {
            bail!(
                "{} expects {} features but the encoder produces {}",
                SEGMENT_MODEL_FILE,
                segment.n_features(),
                SEGMENT_FEATURES
            );
        }
        if scaler.width() != CHURN_FEATURES {
            bail!(
                "{} covers {} features but the encoder produces {}",
                SCALER_FILE,
                scaler.width(),
                CHURN_FEATURES
            );
        }

        info!(
            trees = churn.trees.len(),
            clusters = segment.n_clusters(),
            "model bundle loaded"
        );
        warn!("scaler artifact loaded but not applied; models consume unscaled features");

        Ok(ModelBundle {
            churn,
            segment,
            scaler,
        })
    }

    /// Run one analysis request: encode the profile, infer with both
    /// models, interpret the raw outputs.
    pub fn analyze(&self, profile: &CustomerProfile) -> Result<Prediction> {
        let churn_input = encode::churn_vector(profile);
        let churn_probability = self.churn.predict_proba(&churn_input)?;

        let segment_input = encode::segment_vector(profile);
        let segment_label = self.segment.predict(&segment_input)?;

        debug!(segment_label, churn_probability, "inference complete");
        Ok(Prediction::from_raw(segment_label, churn_probability))
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read model artifact {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse model artifact {}", path.display()))
}
