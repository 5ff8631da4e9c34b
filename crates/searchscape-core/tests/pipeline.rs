//! Integration tests for the log -> scene -> artifact pipeline.
//!
//! Each test writes a small search log and config into a temporary
//! directory and drives the public API end to end.

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::cast_precision_loss
)]

use std::path::Path;

use searchscape_core::config::BuildConfig;
use searchscape_core::logs::load_logs;
use searchscape_core::{
    build_scene, generate_scene, load_or_generate, FileSceneStore, PipelineError, SceneError,
    SceneStore, SearchscapeConfig,
};

const HEADER: &str = "timestamp,query,intent_topic,session_id,clicks,dwell_seconds,result_count\n";

const SAMPLE_LOG: &str = "\
2024-05-01T11:30:00,best hiking boots,outdoors,s-2,1,20,80
2024-05-01T09:00:00,cheap flights lisbon,travel,s-1,4,60,120
2024-05-01T09:20:00,lisbon hotels,travel,s-1,2,35.5,95
2024-05-01T10:05:00,rust async tutorial,programming,s-3,6,240,300
2024-05-01T10:40:00,tokio select macro,programming,s-3,3,90,150
2024-05-01T13:55:00,trail maps sintra,outdoors,s-2,0,0,12
";

fn write_fixture(dir: &Path, log_body: &str, config_yaml: &str) -> SearchscapeConfig {
    std::fs::create_dir_all(dir.join("sample_logs")).unwrap();
    std::fs::write(dir.join("sample_logs/queries.csv"), format!("{HEADER}{log_body}")).unwrap();
    let config_path = dir.join("searchscape.yaml");
    std::fs::write(&config_path, config_yaml).unwrap();
    SearchscapeConfig::from_file(&config_path).unwrap()
}

#[test]
fn generate_writes_artifact_and_returns_scene() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), SAMPLE_LOG, "terrain:\n  smoothing_window: 3\n");
    let store = FileSceneStore::new(config.output_path());

    let scene = generate_scene(&config, &store).unwrap();

    assert!(store.exists());
    assert_eq!(store.read().unwrap(), scene);
    assert_eq!(scene.queries.len(), 6);
    // 09:00 -> 13:55 is 295 minutes -> 5 one-hour buckets
    assert_eq!(scene.terrain_profile.len(), 5);

    let topics: Vec<&str> = scene.metadata.topics.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(topics, vec!["travel", "programming", "outdoors"]);
}

#[test]
fn scene_properties_hold() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), SAMPLE_LOG, "terrain:\n  smoothing_window: 2\n");
    let events = load_logs(&config.input_path()).unwrap();
    let build = config.build_config();
    let scene = build_scene(&events, &build).unwrap();

    let bucket_count = scene.terrain_profile.len() as f64;
    let total: f64 = scene.terrain_profile.iter().map(|p| p.height).sum();
    assert!(total <= bucket_count * build.max_height);

    for point in &scene.terrain_profile {
        assert!((0.0..=build.max_height).contains(&point.height));
        assert!(point.top_topics.len() <= 3);
    }
    for query in &scene.queries {
        assert!((0.0..=1.0).contains(&query.metrics.engagement));
        assert!((0.0..=build.max_height).contains(&query.position[1]));
        assert!((0.0..=build.length_units).contains(&query.position[0]));
        for component in &query.embedding {
            assert!((0.0..1.0).contains(component));
        }
    }
    assert_eq!(scene.terrain_profile.last().unwrap().x, build.length_units);
}

#[test]
fn input_order_does_not_change_output() {
    let events = {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path(), SAMPLE_LOG, "");
        load_logs(&config.input_path()).unwrap()
    };
    let mut reversed = events.clone();
    reversed.reverse();

    let config = BuildConfig::default();
    let a = serde_json::to_string(&build_scene(&events, &config).unwrap()).unwrap();
    let b = serde_json::to_string(&build_scene(&reversed, &config).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_log_fails_without_touching_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), SAMPLE_LOG, "");
    let store = FileSceneStore::new(config.output_path());
    let original = generate_scene(&config, &store).unwrap();

    std::fs::write(config.input_path(), HEADER).unwrap();
    let result = generate_scene(&config, &store);

    assert!(matches!(
        result,
        Err(PipelineError::Scene {
            source: SceneError::EmptyInput
        })
    ));
    assert_eq!(store.read().unwrap(), original);
}

#[test]
fn empty_log_never_creates_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), "", "");
    let store = FileSceneStore::new(config.output_path());

    assert!(generate_scene(&config, &store).is_err());
    assert!(!store.exists());
}

#[test]
fn malformed_row_aborts_generation() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!("{SAMPLE_LOG}not-a-date,q,t,s,1,1,1\n");
    let config = write_fixture(dir.path(), &body, "");
    let store = FileSceneStore::new(config.output_path());

    let result = generate_scene(&config, &store);
    assert!(matches!(result, Err(PipelineError::Log { .. })));
    assert!(!store.exists());
}

#[test]
fn load_or_generate_uses_cache_until_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(dir.path(), SAMPLE_LOG, "");
    let store = FileSceneStore::new(config.output_path());

    // First call generates because nothing is cached.
    let first = load_or_generate(&config, &store, false).unwrap();
    assert_eq!(first.queries.len(), 6);

    // Changing the log does not affect the cached read...
    std::fs::write(
        config.input_path(),
        format!("{HEADER}2024-05-01T09:00:00,solo,misc,s,1,1,1\n"),
    )
    .unwrap();
    let cached = load_or_generate(&config, &store, false).unwrap();
    assert_eq!(cached, first);

    // ...until a refresh is requested.
    let refreshed = load_or_generate(&config, &store, true).unwrap();
    assert_eq!(refreshed.queries.len(), 1);
    assert_eq!(store.read().unwrap(), refreshed);
}

#[test]
fn missing_log_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("searchscape.yaml");
    std::fs::write(&config_path, "input_csv: nowhere.csv\n").unwrap();
    let config = SearchscapeConfig::from_file(&config_path).unwrap();
    let store = FileSceneStore::new(config.output_path());

    let err = load_or_generate(&config, &store, false).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn shipped_sample_matches_reference_output() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let config = SearchscapeConfig::from_file(&root.join("searchscape.yaml")).unwrap();
    let events = load_logs(&config.input_path()).unwrap();
    let scene = build_scene(&events, &config.build_config()).unwrap();
    let json = serde_json::to_value(&scene).unwrap();

    assert_eq!(json["metadata"]["start"], "2024-05-01T08:05:00");
    assert_eq!(json["metadata"]["end"], "2024-05-01T15:25:00");
    assert_eq!(json["queries"][0]["timestamp"], "2024-05-01T08:05:00");

    let engagement: Vec<f64> = scene.queries.iter().map(|q| q.metrics.engagement).collect();
    assert_eq!(
        engagement,
        vec![
            0.253, 0.438, 0.142, 0.572, 0.783, 0.293, 0.122, 1.0, 0.321, 0.012, 0.532, 0.112,
            0.667, 0.353,
        ]
    );
    assert_eq!(scene.queries[1].position, [4.091, 17.5, 0.0]);
    assert_eq!(scene.queries[2].position, [11.455, 5.667, 10.0]);

    let heights: Vec<f64> = scene.terrain_profile.iter().map(|p| p.height).collect();
    assert_eq!(
        heights,
        vec![3.199, 2.542, 2.982, 1.679, 1.887, 1.262, 1.585, 1.452]
    );
    let xs: Vec<f64> = scene.terrain_profile.iter().map(|p| p.x).collect();
    assert_eq!(
        xs,
        vec![0.0, 17.143, 34.286, 51.429, 68.571, 85.714, 102.857, 120.0]
    );
    let top: Vec<Vec<String>> = scene
        .terrain_profile
        .iter()
        .map(|p| p.top_topics.clone())
        .collect();
    assert_eq!(
        top,
        vec![
            vec!["information retrieval", "visualization"],
            vec!["information retrieval", "visualization"],
            vec!["programming"],
            vec!["hci"],
            vec!["misc"],
            vec!["information retrieval", "programming"],
            vec!["visualization"],
            vec!["hci"],
        ]
    );
}
