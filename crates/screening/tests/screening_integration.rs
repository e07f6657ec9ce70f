//! Integration tests for screening from artifacts on disk

use screening::{
    ArtifactConfig, CategoricalEncoders, IsolationForestModel, LocalFileLoader, ModelLoader,
    Screener, ScreeningError, TransactionForm, TransactionModel, TransactionRecord, Verdict,
    COLUMNS, UNKNOWN_CATEGORY,
};
use serde_json::json;
use std::path::Path;

/// Forest that isolates amounts above 10,000 and unknown merchants quickly.
fn forest() -> serde_json::Value {
    json!({
        "feature_names": COLUMNS,
        "max_samples": 256,
        "offset": -0.55,
        "trees": [
            {
                "children_left":  [1, 3, -1, -1, -1],
                "children_right": [2, 4, -1, -1, -1],
                "feature":        [5, 3, -2, -2, -2],
                "threshold":      [10000.0, -0.5, -2.0, -2.0, -2.0],
                "n_node_samples": [256, 254, 2, 1, 253]
            },
            {
                "features": [5, 3, 0],
                "children_left":  [1, -1, 3, -1, -1],
                "children_right": [2, -1, 4, -1, -1],
                "feature":        [1, -2, 0, -2, -2],
                "threshold":      [-0.5, -2.0, 10000.0, -2.0, -2.0],
                "n_node_samples": [256, 1, 255, 253, 2]
            }
        ]
    })
}

fn write_artifacts(dir: &Path) {
    std::fs::write(
        dir.join("div_name_encoder.json"),
        json!(["FINANCE", "POLICE", "WATER"]).to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.join("merchant_encoder.json"),
        json!({"classes": ["AMAZON", "DELL", "STAPLES"]}).to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.join("cat_desc_encoder.json"),
        json!(["BOOKS", "FUEL", "TRAVEL"]).to_string(),
    )
    .unwrap();
    std::fs::write(dir.join("isolation_forest.json"), forest().to_string()).unwrap();
}

fn form(merchant: &str, amt: &str) -> TransactionForm {
    TransactionForm {
        fiscal_yr: Some("2024".into()),
        fiscal_mth: Some("2".into()),
        div_name: Some("WATER".into()),
        merchant: Some(merchant.into()),
        cat_desc: Some("TRAVEL".into()),
        amt: Some(amt.into()),
        year: Some("2023".into()),
        month: Some("8".into()),
        day_of_week: Some("1".into()),
        fiscal_quarter: Some("1".into()),
    }
}

#[test]
fn test_load_and_screen_normal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let screener = Screener::load(&ArtifactConfig::local(dir.path())).unwrap();
    assert_eq!(screener.model().name(), "isolation_forest");

    let verdict = screener.screen(&form("DELL", "250.00")).unwrap();
    assert_eq!(verdict, Verdict::Normal);
    assert_eq!(verdict.to_string(), "This is a normal transaction.");
}

#[test]
fn test_large_amount_is_anomalous() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let screener = Screener::load(&ArtifactConfig::local(dir.path())).unwrap();
    let verdict = screener.screen(&form("DELL", "250000")).unwrap();
    assert_eq!(verdict, Verdict::Anomalous);
    assert_eq!(verdict.to_string(), "This transaction is anomalous!");
}

#[test]
fn test_unseen_merchant_encoded_as_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let screener = Screener::load(&ArtifactConfig::local(dir.path())).unwrap();
    let record = screener.record(&form("CORNER SHOP", "250.00")).unwrap();
    assert_eq!(record.merchant, UNKNOWN_CATEGORY);
    assert_eq!(record.div_name, 2);
    assert_eq!(record.cat_desc, 2);

    // The sentinel is isolated by the merchant split, but a verdict is still produced.
    assert!(screener.screen(&form("CORNER SHOP", "250.00")).is_ok());
}

#[test]
fn test_encoders_stable_across_loads() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let config = ArtifactConfig::local(dir.path());

    let first = CategoricalEncoders::load(&config).unwrap();
    let second = CategoricalEncoders::load(&config).unwrap();
    for merchant in ["AMAZON", "DELL", "STAPLES", "UNKNOWN"] {
        assert_eq!(first.encode_merchant(merchant), second.encode_merchant(merchant));
    }
}

#[test]
fn test_non_numeric_amount_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let screener = Screener::load(&ArtifactConfig::local(dir.path())).unwrap();
    let err = screener.screen(&form("DELL", "abc")).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_missing_encoder_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    std::fs::remove_file(dir.path().join("merchant_encoder.json")).unwrap();

    let err = Screener::load(&ArtifactConfig::local(dir.path())).unwrap_err();
    assert!(matches!(err, ScreeningError::Artifact { .. }));
    assert!(err.to_string().contains("merchant_encoder.json"));
}

#[test]
fn test_local_loader_matches_direct_model() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let path = dir.path().join("isolation_forest.json");

    let direct = IsolationForestModel::load(&path).unwrap();
    let loaded = LocalFileLoader::new(&path).load().unwrap();

    for amt in [1.0, 9999.0, 10001.0, 1e7] {
        let record = TransactionRecord {
            fiscal_yr: 2024,
            merchant: 1,
            amt,
            ..Default::default()
        };
        assert_eq!(direct.predict(&record).unwrap(), loaded.predict(&record).unwrap());
    }
}

#[test]
fn test_demo_artifacts_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/artifacts");
    let screener = Screener::load(&ArtifactConfig::local(&dir)).unwrap();

    let mut everyday = form("STAPLES", "84.20");
    everyday.div_name = Some("FINANCE".into());
    everyday.cat_desc = Some("OFFICE SUPPLIES".into());
    assert_eq!(screener.screen(&everyday).unwrap(), Verdict::Normal);

    let outlier = form("UNKNOWN VENDOR", "25000");
    assert_eq!(screener.screen(&outlier).unwrap(), Verdict::Anomalous);
}
