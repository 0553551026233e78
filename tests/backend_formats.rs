//! One refresh-cycle smoke test per shipped on-disk schema, confirming
//! each backend's parsed flags actually drive `Flagset::enabled`.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flagset::backend::condition_json::ConditionJsonBackend;
use flagset::backend::json_v1::JsonV1Backend;
use flagset::{Flagset, FlagsetOptions};

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().expect("tempfile");
    write!(file, "{contents}").expect("write");
    file
}

#[tokio::test]
async fn json_v1_backend_drives_evaluator() {
    let file = write_temp(
        r#"{
            "version": 1,
            "updated": 1700000000.0,
            "flags": [
                { "name": "on", "active": true, "rules": [] },
                { "name": "gated", "active": true, "rules": [
                    { "type": "match_list", "property": "plan", "values": ["pro"] }
                ]}
            ]
        }"#,
        ".json",
    );
    let backend = Arc::new(JsonV1Backend::new(file.path()));
    let flagset = Flagset::new(backend, FlagsetOptions::new());
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(flagset.enabled("on", ()));

    let mut pro = flagset::TagMap::new();
    pro.insert("plan".to_string(), "pro".to_string());
    assert!(flagset.enabled("gated", pro));

    let mut free = flagset::TagMap::new();
    free.insert("plan".to_string(), "free".to_string());
    assert!(!flagset.enabled("gated", free));

    flagset.close().await;
}

#[tokio::test]
async fn condition_json_backend_falls_through_on_miss() {
    let file = write_temp(
        r#"{
            "version": 1,
            "updated": 1.0,
            "flags": [
                { "name": "cond", "active": true, "rules": [
                    { "type": "match_list", "property": "beta", "values": ["yes"] },
                    { "type": "sample", "rate": 1.0 }
                ]}
            ]
        }"#,
        ".json",
    );
    let backend = Arc::new(ConditionJsonBackend::new(file.path()));
    let flagset = Flagset::new(backend, FlagsetOptions::new());
    tokio::time::sleep(Duration::from_millis(30)).await;

    // "beta" present but not "yes" -> match_list misses -> on_miss defaults
    // to Continue (the condition-variant default) -> falls through to the
    // always-matching sample rule -> enabled.
    let mut not_beta = flagset::TagMap::new();
    not_beta.insert("beta".to_string(), "no".to_string());
    assert!(flagset.enabled("cond", not_beta));

    flagset.close().await;
}
