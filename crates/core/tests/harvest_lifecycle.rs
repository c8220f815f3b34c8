//! Harvest lifecycle integration tests.
//!
//! These tests run the full pipeline with a mock transport:
//! - Record fan-out and summary fan-in
//! - Per-stage failure accounting
//! - Create-only persistence
//! - Governor close after the run

use std::time::Duration;

use tempfile::TempDir;

use wimsnap_core::{
    pipeline::Stage,
    testing::{fixtures, MockPrompter, MockTransport},
    Harvester, ImageStore, NetGovernor, PathDirector, Transport, VehicleRecord, ALL_LEVELS,
};

/// Test helper wiring the pipeline to mocks.
struct TestHarness {
    harvester: Harvester<MockTransport, MockPrompter>,
    transport: MockTransport,
    save_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::at_level(3)
    }

    fn at_level(level: usize) -> Self {
        let save_dir = TempDir::new().expect("Failed to create save dir");
        let transport = MockTransport::new();
        let governor = NetGovernor::new(
            transport.clone(),
            MockPrompter::always(true),
            &ALL_LEVELS[level],
            Duration::ZERO,
            u64::MAX,
        );
        let harvester = Harvester::new(
            governor,
            ImageStore::new(save_dir.path()),
            PathDirector::new("jpg", "xx"),
            true,
            vec!["SNAP".to_string(), "SNAPB".to_string()],
        );
        Self {
            harvester,
            transport,
            save_dir,
        }
    }

    fn detail_path(vehicle_id: i64) -> String {
        format!("/api/1.0/vehicle/detail?id={}", vehicle_id)
    }
}

#[tokio::test]
async fn full_run_counts_every_stage_and_closes_the_governor() {
    let harness = TestHarness::new();

    // Vehicle 2 goes all the way; vehicle 1 has no detail route (404); the
    // third record has no id at all.
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(2),
            fixtures::detail_body(2, &[("SNAP", "/image/2")]),
        )
        .await;
    harness
        .transport
        .respond_ok("/image/2", &b"image bytes"[..])
        .await;

    let records = vec![
        fixtures::record(1),
        fixtures::record(2),
        fixtures::record_without_id(),
    ];
    let summary = harness.harvester.run(records).await;

    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].vehicle_id, 1);
    assert_eq!(summary.failures[0].stage, Stage::DetailFetch);

    // The skipped record never produced a request.
    assert_eq!(harness.transport.request_count().await, 3);
    assert!(harness.transport.is_closed().await);

    // The image actually landed under location/class directories.
    let saved = harness
        .save_dir
        .path()
        .join("brno_L2/car_3/brno_L2#20230401T100203.123.jpg");
    assert_eq!(tokio::fs::read(saved).await.unwrap(), b"image bytes");
}

#[tokio::test]
async fn selection_failure_counts_as_parsed_but_not_downloaded() {
    let harness = TestHarness::new();
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(5),
            fixtures::detail_body(5, &[("OVERVIEW", "/image/5")]),
        )
        .await;

    let summary = harness.harvester.run(vec![fixtures::record(5)]).await;

    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.saved, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Selection);
}

#[tokio::test]
async fn connection_failures_terminate_the_task_without_counting() {
    let harness = TestHarness::new();

    // Vehicle 21: the detail request itself dies on the wire. Vehicle 22:
    // detail decodes fine, the image request dies on the wire.
    harness
        .transport
        .fail_with(&TestHarness::detail_path(21), "connection reset")
        .await;
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(22),
            fixtures::detail_body(22, &[("SNAP", "/image/22")]),
        )
        .await;
    harness
        .transport
        .fail_with("/image/22", "connection reset")
        .await;

    let records = vec![fixtures::record(21), fixtures::record(22)];
    let summary = harness.harvester.run(records).await;

    // Only the record whose detail decoded counts as parsed; nothing was
    // downloaded or saved.
    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.saved, 0);
    assert_eq!(summary.failures.len(), 2);

    let failure_of = |id| {
        summary
            .failures
            .iter()
            .find(|f| f.vehicle_id == id)
            .unwrap()
    };
    assert_eq!(failure_of(21).stage, Stage::DetailFetch);
    assert_eq!(failure_of(22).stage, Stage::ImageFetch);
    assert!(failure_of(21).message.contains("connection reset"));
    assert!(failure_of(22).message.contains("Connection failed"));
}

#[tokio::test]
async fn empty_image_list_is_a_selection_failure() {
    let harness = TestHarness::new();
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(6),
            fixtures::detail_body_without_images(6),
        )
        .await;

    let summary = harness.harvester.run(vec![fixtures::record(6)]).await;

    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Selection);
    assert!(summary.failures[0].message.contains("No images"));
}

#[tokio::test]
async fn missing_image_route_is_an_image_fetch_failure() {
    let harness = TestHarness::new();
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(7),
            fixtures::detail_body(7, &[("SNAP", "/image/7")]),
        )
        .await;
    // No route for /image/7; the mock answers 404.

    let summary = harness.harvester.run(vec![fixtures::record(7)]).await;

    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::ImageFetch);
    assert!(summary.failures[0].message.contains("bad status code"));

    // The single task issued exactly the detail and image requests, in
    // step order.
    assert_eq!(
        harness.transport.recorded_requests().await,
        vec![TestHarness::detail_path(7), "/image/7".to_string()]
    );
}

#[tokio::test]
async fn colliding_save_paths_let_exactly_one_record_win() {
    let harness = TestHarness::new();
    harness
        .transport
        .respond_ok(
            &TestHarness::detail_path(9),
            fixtures::detail_body(9, &[("SNAP", "/image/9")]),
        )
        .await;
    harness
        .transport
        .respond_ok("/image/9", &b"image bytes"[..])
        .await;

    // The same record twice: both fetch the same detail and image, both
    // derive the same save path, only one write can succeed.
    let records = vec![fixtures::record(9), fixtures::record(9)];
    let summary = harness.harvester.run(records).await;

    assert_eq!(summary.parsed, 2);
    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Save);
    assert!(summary.saved <= summary.downloaded && summary.downloaded <= summary.parsed);
}

#[tokio::test]
async fn declined_confirmation_at_level_zero_downloads_nothing() {
    let save_dir = TempDir::new().expect("Failed to create save dir");
    let transport = MockTransport::new();
    let prompter = MockPrompter::always(false);
    let governor = NetGovernor::new(
        transport.clone(),
        prompter.clone(),
        &ALL_LEVELS[0],
        Duration::ZERO,
        u64::MAX,
    );
    let harvester = Harvester::new(
        governor,
        ImageStore::new(save_dir.path()),
        PathDirector::new("jpg", "xx"),
        true,
        vec!["SNAP".to_string()],
    );

    let summary = harvester.run(vec![fixtures::record(3)]).await;

    // The synthetic refusal surfaces as a detail fetch failure; the
    // transport never saw a request.
    assert_eq!(summary.parsed, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::DetailFetch);
    assert_eq!(transport.request_count().await, 0);
    assert_eq!(prompter.prompt_count().await, 1);
}

#[tokio::test]
async fn records_with_mixed_outcomes_keep_counter_ordering() {
    let harness = TestHarness::new();

    for id in [11, 12, 13] {
        harness
            .transport
            .respond_ok(
                &TestHarness::detail_path(id),
                fixtures::detail_body(id, &[("SNAP", &format!("/image/{}", id))]),
            )
            .await;
    }
    // 11 and 12 get their images; 13's image route is missing.
    harness.transport.respond_ok("/image/11", &b"a"[..]).await;
    harness.transport.respond_ok("/image/12", &b"b"[..]).await;

    let records: Vec<VehicleRecord> = [11, 12, 13].into_iter().map(fixtures::record).collect();
    let summary = harness.harvester.run(records).await;

    assert_eq!(summary.parsed, 3);
    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.saved, 2);
    assert!(summary.saved <= summary.downloaded && summary.downloaded <= summary.parsed);
}
