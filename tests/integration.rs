//! Integration tests for ChurnRadar

use std::io::Write;
use std::path::Path;

use churnradar::interpret::ChurnTier;
use churnradar::model::{ModelBundle, CHURN_MODEL_FILE, SCALER_FILE, SEGMENT_MODEL_FILE};
use churnradar::profile::{Category, Country, CustomerProfile, Device, Gender};
use churnradar::{batch, encode, report};
use serde_json::json;
use tempfile::{tempdir, NamedTempFile};

/// Write a complete, hand-checkable artifact bundle.
///
/// The churn model is a single stump on days_since_last_purchase with a
/// split at 100 (leaf -1.0 below, +1.5 at or above, bias 0), so the two
/// reachable probabilities are sigmoid(-1) and sigmoid(1.5). Segment
/// centroids 4 and 6 sit exactly on the two test profiles; every other
/// centroid is far away.
fn write_artifacts(dir: &Path) {
    let churn = json!({
        "n_features": 11,
        "bias": 0.0,
        "trees": [{ "nodes": [
            { "kind": "split", "feature": 0, "threshold": 100.0, "left": 1, "right": 2 },
            { "kind": "leaf", "value": -1.0 },
            { "kind": "leaf", "value": 1.5 }
        ]}],
        "meta": { "algorithm": "xgboost", "version": "1.0" }
    });
    std::fs::write(dir.join(CHURN_MODEL_FILE), churn.to_string()).unwrap();

    let mut centroids: Vec<Vec<f64>> = (0..7)
        .map(|i| vec![5_000.0 + 1_000.0 * i as f64; 12])
        .collect();
    centroids[4] = vec![
        30.0, 240.0, 0.0, 35.0, 1.0, 1.0, 0.0, 10.0, 500.0, 50.0, 0.0, 0.0,
    ];
    centroids[6] = vec![
        400.0, 10.0, 9.0, 72.0, 2.0, 2.0, 7.0, 4.0, 120.0, 30.0, 1.0, 0.0,
    ];
    let segment = json!({ "centroids": centroids, "meta": { "algorithm": "kmeans" } });
    std::fs::write(dir.join(SEGMENT_MODEL_FILE), segment.to_string()).unwrap();

    let scaler = json!({ "mean": vec![0.0; 11], "scale": vec![1.0; 11] });
    std::fs::write(dir.join(SCALER_FILE), scaler.to_string()).unwrap();
}

/// The analysis form's default profile.
fn reference_profile() -> CustomerProfile {
    CustomerProfile {
        days_since_last_purchase: 30,
        account_age_days: 240,
        country: Country::Australia,
        age: 35,
        gender: Gender::Male,
        device: Device::Mobile,
        category: Category::Beauty,
        total_orders: 10,
        total_spent: 500.0,
        is_premium: false,
    }
}

/// A long-inactive customer that lands on the high-churn leaf.
fn stale_profile() -> CustomerProfile {
    CustomerProfile {
        days_since_last_purchase: 400,
        account_age_days: 10,
        country: Country::UnitedStates,
        age: 72,
        gender: Gender::Other,
        device: Device::Tablet,
        category: Category::Toys,
        total_orders: 4,
        total_spent: 120.0,
        is_premium: true,
    }
}

fn create_profiles_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_id,days_since_last_purchase,account_age_days,country,age,gender,device,category,total_orders,total_spent,is_premium").unwrap();
    writeln!(file, "c-001,30,240,Australia,35,Male,Mobile,Beauty,10,500.0,No").unwrap();
    writeln!(file, "c-002,400,10,United States,72,Other,Tablet,Toys,4,120.0,Yes").unwrap();
    file
}

#[test]
fn test_single_analysis_end_to_end() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());

    let bundle = ModelBundle::load(dir.path()).unwrap();
    let profile = reference_profile();

    // The encoded vector is the documented trained column order
    let encoded = encode::churn_vector(&profile);
    assert_eq!(
        encoded.to_vec(),
        vec![30.0, 240.0, 0.0, 35.0, 1.0, 1.0, 0.0, 10.0, 500.0, 50.0, 0.0]
    );

    let prediction = bundle.analyze(&profile).unwrap();
    assert_eq!(prediction.segment_label, 4);
    assert_eq!(prediction.segment.name, "Top Customer");
    assert_eq!(prediction.segment.badge.as_str(), "champion");
    assert!((prediction.churn_pct - 100.0 / (1.0 + 1.0f64.exp())).abs() < 1e-9);
    assert_eq!(prediction.tier, ChurnTier::Low);

    let stale = bundle.analyze(&stale_profile()).unwrap();
    assert_eq!(stale.segment.name, "Big Spender");
    assert_eq!(stale.segment.badge.as_str(), "at-risk");
    assert!((stale.churn_pct - 100.0 / (1.0 + (-1.5f64).exp())).abs() < 1e-9);
    assert_eq!(stale.tier, ChurnTier::High);
}

#[test]
fn test_identical_input_gives_identical_output() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());

    let first_bundle = ModelBundle::load(dir.path()).unwrap();
    let second_bundle = ModelBundle::load(dir.path()).unwrap();
    let profile = reference_profile();

    let a = first_bundle.analyze(&profile).unwrap();
    let b = first_bundle.analyze(&profile).unwrap();
    let c = second_bundle.analyze(&profile).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn test_missing_artifacts_leave_encoding_usable() {
    let dir = tempdir().unwrap();

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("models unavailable"));

    // encoding works without any artifacts on disk
    let vector = encode::segment_vector(&reference_profile());
    assert_eq!(vector.len(), 12);
    assert_eq!(vector[11], 0.0);
}

#[test]
fn test_partial_bundle_is_unavailable() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    std::fs::remove_file(dir.path().join(CHURN_MODEL_FILE)).unwrap();

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(err.reason.contains(CHURN_MODEL_FILE));
}

#[test]
fn test_labels_beyond_the_table_fall_back_to_unknown() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());

    // a nine-cluster artifact is still a valid bundle
    let mut centroids: Vec<Vec<f64>> = (0..9)
        .map(|i| vec![5_000.0 + 1_000.0 * i as f64; 12])
        .collect();
    centroids[8] = vec![
        400.0, 10.0, 9.0, 72.0, 2.0, 2.0, 7.0, 4.0, 120.0, 30.0, 1.0, 0.0,
    ];
    let segment = json!({ "centroids": centroids });
    std::fs::write(dir.path().join(SEGMENT_MODEL_FILE), segment.to_string()).unwrap();

    let bundle = ModelBundle::load(dir.path()).unwrap();
    let prediction = bundle.analyze(&stale_profile()).unwrap();
    assert_eq!(prediction.segment_label, 8);
    assert_eq!(prediction.segment.name, "Unknown");
    assert_eq!(prediction.segment.badge.as_str(), "lost");
    assert_eq!(prediction.tier, ChurnTier::High);
}

#[test]
fn test_batch_round_trip() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let bundle = ModelBundle::load(dir.path()).unwrap();

    let input = create_profiles_csv();
    let output = dir.path().join("scored.csv");
    let summary = batch::score_csv(&bundle, input.path(), &output).unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.segment_counts[4], 1);
    assert_eq!(summary.segment_counts[6], 1);
    assert_eq!(summary.tier_counts, [1, 0, 1]);
    assert_eq!(summary.churn_pcts.len(), 2);

    let content = std::fs::read_to_string(&output).unwrap();
    let mut lines = content.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("customer_id,"));
    assert!(header.ends_with("segment_label,segment_name,badge_class,churn_pct,churn_tier"));

    let first = lines.next().unwrap();
    assert!(first.starts_with("c-001,"));
    assert!(first.contains("Top Customer"));
    assert!(first.contains("champion"));
    assert!(first.ends_with("Low"));

    let second = lines.next().unwrap();
    assert!(second.starts_with("c-002,"));
    assert!(second.contains("Big Spender"));
    assert!(second.contains("at-risk"));
    assert!(second.ends_with("High"));

    assert_eq!(lines.next(), None);
}

#[test]
fn test_batch_rejects_invalid_rows_with_row_numbers() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let bundle = ModelBundle::load(dir.path()).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "days_since_last_purchase,account_age_days,country,age,gender,device,category,total_orders,total_spent,is_premium").unwrap();
    writeln!(file, "30,240,Australia,35,Male,Mobile,Beauty,10,500.0,No").unwrap();
    writeln!(file, "30,240,Australia,35,Male,Teleporter,Beauty,10,500.0,No").unwrap();

    let err = batch::score_csv(&bundle, file.path(), &dir.path().join("out.csv")).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("row 2"));
    assert!(chain.contains("unknown device 'Teleporter'"));
}

#[test]
fn test_json_report_round_trip() {
    let dir = tempdir().unwrap();
    write_artifacts(dir.path());
    let bundle = ModelBundle::load(dir.path()).unwrap();

    let profile = reference_profile();
    let prediction = bundle.analyze(&profile).unwrap();
    let analysis = report::build_report(&profile, &prediction);

    let path = dir.path().join("analysis.json");
    report::write_json(&path, &analysis).unwrap();

    let parsed: report::AnalysisReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.tool, "churnradar");
    assert_eq!(parsed.profile, profile);
    assert_eq!(parsed.segment.label, 4);
    assert_eq!(parsed.segment.name, "Top Customer");
    assert_eq!(parsed.churn.tier, "Low");
    assert_eq!(parsed.churn.description, "This customer is likely to stay");
}
