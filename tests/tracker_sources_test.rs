mod common;

use std::io::Write;

use camino::Utf8PathBuf;
use common::{epoch_iso, omm_value, reference, ISS_L1, ISS_L2};
use satcat::{
    CatalogSource, OpMode, SatcatError, SceneRecorder, Sgp4Propagator, Tracker, TrackerConfig,
};
use serde_json::json;
use tempfile::NamedTempFile;

fn tracker(config: TrackerConfig) -> Tracker<Sgp4Propagator, SceneRecorder> {
    Tracker::new(config, SceneRecorder::new()).unwrap()
}

fn temp_source(suffix: &str, content: &str) -> (NamedTempFile, Utf8PathBuf) {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();
    (file, path)
}

fn stations_json() -> String {
    json!([
        omm_value(48274, "CSS (TIANHE)", &epoch_iso(22)),
        omm_value(25544, "ISS (ZARYA)", &epoch_iso(19)),
        omm_value(49044, "ISS (NAUKA)", &epoch_iso(19)),
        {"OBJECT_NAME": "MISSING ELEMENTS", "NORAD_CAT_ID": 1}
    ])
    .to_string()
}

#[tokio::test]
async fn test_ingest_local_json() {
    let (_file, path) = temp_source(".json", &stations_json());
    let source = CatalogSource::try_from(path.as_str()).unwrap();
    assert_eq!(source, CatalogSource::JsonFile(path.clone()));

    let mut tracker = tracker(TrackerConfig::default());
    assert!(!tracker.is_ingest_complete());

    let report = tracker.ingest(&source, &reference()).await.unwrap();
    assert_eq!(report.received, 4);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.parse_failures, 1);
    assert_eq!(tracker.catalog_size(), 3);
    assert!(tracker.is_ingest_complete());

    let tick = tracker.tick(&reference()).unwrap();
    assert_eq!(tick.shard, 0);
    assert_eq!(tick.updated, 1);
}

#[tokio::test]
async fn test_ingest_local_tle() {
    let text = format!("ISS (ZARYA)\n{ISS_L1}\n{ISS_L2}\nORPHAN\n");
    let (_file, path) = temp_source(".tle", &text);
    let source = CatalogSource::try_from(path.as_str()).unwrap();

    let mut tracker = tracker(TrackerConfig::default());
    let report = tracker.ingest(&source, &reference()).await.unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.parse_failures, 1);
    let iss = tracker.catalog().get(25544).unwrap();
    assert_eq!(iss.name(), "ISS (ZARYA)");
    assert_eq!(iss.epoch().to_gregorian_utc(), (2025, 11, 9, 23, 14, 21, 578_000_000));
}

#[tokio::test]
async fn test_missing_file_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).unwrap();
    let source = CatalogSource::JsonFile(path);

    let mut tracker = tracker(TrackerConfig::default());
    let err = tracker.ingest(&source, &reference()).await.unwrap_err();
    assert!(matches!(err, SatcatError::SourceFetch { .. }), "{err}");
    assert_eq!(tracker.catalog_size(), 0);
    assert!(!tracker.is_ingest_complete());
    assert_eq!(tracker.tick(&reference()), None);
}

#[tokio::test]
async fn test_ingest_remote_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/NORAD/elements/gp.php")
        .match_query(mockito::Matcher::UrlEncoded("GROUP".into(), "stations".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(stations_json())
        .create_async()
        .await;

    let url = format!("{}/NORAD/elements/gp.php?GROUP=stations&FORMAT=json", server.url());
    let source = CatalogSource::try_from(url.as_str()).unwrap();
    assert!(matches!(source, CatalogSource::JsonUrl(_)));

    let mut tracker = tracker(TrackerConfig::default());
    let report = tracker.ingest(&source, &reference()).await.unwrap();
    mock.assert_async().await;

    assert_eq!(report.inserted, 3);
    assert!(tracker.catalog().contains(48274));
}

#[tokio::test]
async fn test_remote_failures_abort_the_batch() {
    let mut server = mockito::Server::new_async().await;
    let _down = server
        .mock("GET", "/down.json")
        .with_status(503)
        .create_async()
        .await;
    let _not_array = server
        .mock("GET", "/object.json")
        .with_status(200)
        .with_body(r#"{"OBJECT_NAME": "ISS (ZARYA)"}"#)
        .create_async()
        .await;

    let mut tracker = tracker(TrackerConfig::default());
    for path in ["/down.json", "/object.json"] {
        let source = CatalogSource::JsonUrl(format!("{}{path}", server.url()));
        let err = tracker.ingest(&source, &reference()).await.unwrap_err();
        match err {
            SatcatError::SourceFetch { location, .. } => assert!(location.ends_with(path)),
            other => panic!("unexpected error {other}"),
        }
    }
    assert_eq!(tracker.catalog_size(), 0);
    assert!(!tracker.is_ingest_complete());
}

#[tokio::test]
async fn test_ingest_configured_sources() {
    let (_json, json_path) = temp_source(".json", &stations_json());
    let (_tle, tle_path) = temp_source(".txt", &format!("0 ISS (ZARYA)\n{ISS_L1}\n{ISS_L2}\n"));

    let config = TrackerConfig {
        opmode: OpMode::Dev,
        shard_count: 2,
        local_sources: vec![json_path.to_string(), tle_path.to_string()],
        ..TrackerConfig::default()
    };
    let mut tracker = tracker(config);
    let report = tracker.ingest_configured(&reference()).await.unwrap();

    // the OMM set of the ISS (2025-11-10T19:00) is fresher than the TLE one (2025-11-09T23:14)
    assert_eq!(report.received, 5);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.stale, 1);
    assert_eq!(tracker.catalog_size(), 3);
    assert_eq!(tracker.shard_count(), 2);
    assert_eq!(tracker.catalog().shard_sizes(), vec![2, 1]);
}

#[tokio::test]
async fn test_configured_sources_merge_all_or_nothing() {
    let (_json, json_path) = temp_source(".json", &stations_json());
    let dir = tempfile::tempdir().unwrap();
    let absent = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).unwrap();

    let config = TrackerConfig {
        opmode: OpMode::Dev,
        local_sources: vec![json_path.to_string(), absent.to_string()],
        ..TrackerConfig::default()
    };
    let mut tracker = tracker(config);
    let err = tracker.ingest_configured(&reference()).await.unwrap_err();

    match err {
        SatcatError::SourceFetch { location, .. } => assert!(location.ends_with("absent.json")),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(tracker.catalog_size(), 0);
    assert!(!tracker.is_ingest_complete());
    assert_eq!(tracker.tick(&reference()), None);
}

#[test]
fn test_invalid_configuration() {
    let config = TrackerConfig {
        shard_count: 0,
        ..TrackerConfig::default()
    };
    assert_eq!(
        Tracker::<Sgp4Propagator, SceneRecorder>::new(config, SceneRecorder::new()).err(),
        Some(SatcatError::InvalidShardCount(0))
    );

    let config = TrackerConfig {
        local_sources: vec!["TLEs/visual.xml".into()],
        ..TrackerConfig::default()
    };
    assert_eq!(
        config.sources(),
        Err(SatcatError::InvalidSource("TLEs/visual.xml".into()))
    );
}
