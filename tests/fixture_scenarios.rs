//! End-to-end fixture scenarios (§8) driven through [`flagset::Flagset`]
//! and the concrete backends, rather than the flag types directly.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flagset::backend::csv_backend::CsvBackend;
use flagset::backend::json_v2::JsonV2Backend;
use flagset::{Flagset, FlagsetOptions};

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().expect("tempfile");
    write!(file, "{contents}").expect("write");
    file
}

/// Fixture scenario 1: CSV backend end to end, including the statistical
/// check on the 50% rate flag.
#[tokio::test]
async fn csv_backend_scenario_one() {
    let file = write_temp("go.sun.money,0\ngo.moon.mercury,1\ngo.stars.money,.5\n", ".csv");
    let backend = Arc::new(CsvBackend::new(file.path()));
    let flagset = Flagset::new(backend, FlagsetOptions::new());
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(!flagset.enabled("go.sun.money", ()));
    assert!(flagset.enabled("go.moon.mercury", ()));

    let trials = 100_000;
    let hits = (0..trials).filter(|_| flagset.enabled("go.stars.money", ())).count();
    let fraction = hits as f64 / trials as f64;
    assert!((0.48..=0.52).contains(&fraction), "observed fraction {fraction}");

    flagset.close().await;
}

/// Fixture scenario 2, driven through the JSON v2 backend instead of a
/// bare `PredicateFlag` (covered already at the unit level in
/// `flag::predicate`).
#[tokio::test]
async fn json_v2_backend_scenario_two() {
    let file = write_temp(
        r#"{
            "version": 1,
            "updated": 1700000000.0,
            "flags": [
                {
                    "name": "random_by_token_flag",
                    "seed": "seed_1",
                    "rules": [{ "hash_by": "token", "percent": 0.2, "predicates": [] }]
                }
            ]
        }"#,
        ".json",
    );
    let backend = Arc::new(JsonV2Backend::new(file.path()));
    let flagset = Flagset::new(backend, FlagsetOptions::new());
    tokio::time::sleep(Duration::from_millis(30)).await;

    let expected = [false, false, true, false, true, true, false, false, false, false];
    for (i, want) in expected.iter().enumerate() {
        let mut tags = flagset::TagMap::new();
        tags.insert("token".to_string(), i.to_string());
        assert_eq!(flagset.enabled("random_by_token_flag", tags), *want, "token {i}");
    }

    flagset.close().await;
}

/// Fixture scenario 6: evaluator-wide override plus a scoped child
/// context, driven through the full evaluator (the override/context
/// mechanics themselves are unit-tested in `overrides`).
#[tokio::test]
async fn override_scenario_six_through_evaluator() {
    let file = write_temp("", ".csv");
    let backend = Arc::new(CsvBackend::new(file.path()));
    let flagset = Flagset::new(backend, FlagsetOptions::new().suppress_errors());

    flagset.override_flag("x", true);
    assert!(flagset.enabled("x", ()));

    let child = flagset::Context::default().with_override("x", false);
    assert!(!flagset.enabled_with_context("x", (), &child));
    assert!(flagset.enabled("x", ()));

    flagset.close().await;
}

/// A refresh that drops flags past the shrink-warning heuristic fires a
/// `FlagsShrunk` error; staying within bounds does not.
#[tokio::test]
async fn shrink_warning_fires_only_past_threshold() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let wide: String = (0..50).map(|i| format!("f{i},0.5\n")).collect();
    let file = write_temp(&wide, ".csv");
    let backend = Arc::new(CsvBackend::new(file.path()));

    let shrink_count = Arc::new(AtomicUsize::new(0));
    let counter = shrink_count.clone();
    let flagset = Flagset::new(
        backend,
        FlagsetOptions::new().refresh_interval(Duration::from_millis(20)).on_error(move |err| {
            if matches!(err, flagset::FlagError::FlagsShrunk { .. }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }),
    );

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(flagset.flag_count(), 50);

    // Shrink the backing file to 5 flags and let the next refresh tick pick it up.
    let narrow: String = (0..5).map(|i| format!("f{i},0.5\n")).collect();
    std::fs::write(file.path(), narrow).expect("rewrite");
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(flagset.flag_count(), 5);
    assert!(shrink_count.load(Ordering::SeqCst) >= 1);

    flagset.close().await;
}
