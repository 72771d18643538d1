//! Integration test: page -> API -> manifest -> segments against a local
//! server with the real curl client, checkpointing into a job-store file.

mod common;

use std::sync::Arc;

use common::site_server::SiteServer;
use recu_core::config::{FetchConfig, RecuConfig};
use recu_core::http::{CurlClient, HeaderProfiles, Headers};
use recu_core::job::{JobSpec, JobStore, JobStoreFile};
use recu_core::mux::StopReason;
use recu_core::scheduler::{JobOrchestrator, JobStatus};
use serde_json::json;
use tempfile::tempdir;

fn config() -> RecuConfig {
    let quick = FetchConfig {
        timeout_secs: Some(5),
        max_retries: Some(1),
        retry_delay_ms: Some(0),
        throttle_delay_ms: Some(0),
        timeout_step_secs: Some(0),
    };
    RecuConfig {
        launch_stagger_ms: 10,
        resolver_fetch: Some(quick.clone()),
        segment_fetch: Some(quick),
        ..RecuConfig::default()
    }
}

fn profiles() -> HeaderProfiles {
    let mut h = Headers::new();
    h.insert("Cookie".to_string(), "session=secret".to_string());
    h.insert("User-Agent".to_string(), "recu-test".to_string());
    HeaderProfiles::new(h)
}

fn orchestrator(out: &std::path::Path, sink: Arc<JobStoreFile>) -> JobOrchestrator {
    JobOrchestrator::new(Arc::new(CurlClient::new()), profiles(), &config(), out, sink)
}

fn write_store(path: &std::path::Path, urls: Vec<serde_json::Value>) {
    let mut store = JobStore::template();
    store.urls = urls;
    store.save(path).unwrap();
}

fn jobs(sink: &JobStoreFile) -> Vec<JobSpec> {
    sink.snapshot()
        .jobs()
        .into_iter()
        .map(|(_, j)| j.unwrap())
        .collect()
}

#[tokio::test]
async fn parallel_run_downloads_every_video() {
    let server = SiteServer::start();
    server.video(1, "alice", 3).video(2, "bob", 2);
    let work = tempdir().unwrap();
    let store_path = work.path().join("config.json");
    write_store(
        &store_path,
        vec![json!(server.url("/video/1/play")), json!([server.url("/video/2/play")])],
    );
    let sink = Arc::new(JobStoreFile::open(&store_path).unwrap());
    let o = orchestrator(work.path(), Arc::clone(&sink));

    let summary = o.run_parallel(jobs(&sink)).await.unwrap();
    assert_eq!(summary.completed, 2, "{:?}", summary.reports);
    assert_eq!(
        std::fs::read(work.path().join("CB_alice_24-01-02_03-04.ts")).unwrap(),
        b"<1:0><1:1><1:2>"
    );
    assert_eq!(
        std::fs::read(work.path().join("CB_bob_24-01-02_03-04.ts")).unwrap(),
        b"<2:0><2:1>"
    );

    // Session cookie goes to the site but not to media requests.
    let page_headers = server.last_headers("/video/1/play").join("\n");
    assert!(page_headers.contains("session=secret"));
    let seg_headers = server
        .last_headers("/hl/alice/2024-01-02_03-04/seg0.ts")
        .join("\n");
    assert!(!seg_headers.contains("session=secret"));
}

#[tokio::test]
async fn expired_segment_checkpoints_and_resume_appends() {
    let server = SiteServer::start();
    server.video(7, "carol", 4);
    server.route("/hl/carol/2024-01-02_03-04/seg2.ts", 410, "gone");
    let work = tempdir().unwrap();
    let store_path = work.path().join("config.json");
    let url = server.url("/video/7/play");
    write_store(&store_path, vec![json!(url)]);

    let sink = Arc::new(JobStoreFile::open(&store_path).unwrap());
    let o = orchestrator(work.path(), Arc::clone(&sink));
    let summary = o.run_serial(jobs(&sink)).await.unwrap();
    assert_eq!(
        summary.reports[0].status,
        JobStatus::FailedAt {
            index: 2,
            reason: StopReason::FetchExhausted
        }
    );
    assert_eq!(server.hits("/hl/carol/2024-01-02_03-04/seg2.ts"), 1);
    assert_eq!(JobStore::load(&store_path).unwrap().urls[0], json!([url, -2]));
    assert!(work.path().join("CB_carol_24-01-02_03-04.m3u8").exists());

    // The segment comes back; a second run resumes at index 2.
    server.route("/hl/carol/2024-01-02_03-04/seg2.ts", 200, "<7:2>");
    let sink = Arc::new(JobStoreFile::open(&store_path).unwrap());
    let o = orchestrator(work.path(), Arc::clone(&sink));
    let summary = o.run_serial(jobs(&sink)).await.unwrap();
    assert_eq!(summary.completed, 1, "{:?}", summary.reports);
    assert_eq!(
        std::fs::read(work.path().join("CB_carol_24-01-02_03-04.ts")).unwrap(),
        b"<7:0><7:1><7:2><7:3>"
    );
    assert_eq!(server.hits("/hl/carol/2024-01-02_03-04/seg0.ts"), 1);
    assert_eq!(JobStore::load(&store_path).unwrap().urls[0], json!([url, 0]));
}

#[tokio::test]
async fn variant_manifest_and_blocked_job() {
    let server = SiteServer::start();
    server.video(3, "dave", 2);
    // Turn dave's manifest into a variant manifest pointing at hi/.
    server.route(
        "/hl/dave/2024-01-02_03-04/index.m3u8",
        200,
        "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=500000,NAME=low\nlo/index.m3u8\n\
         #EXT-X-STREAM-INF:BANDWIDTH=3000000,NAME=max\nhi/index.m3u8\n",
    );
    server.route(
        "/hl/dave/2024-01-02_03-04/hi/index.m3u8",
        200,
        "#EXTINF:2,\na.ts\n#EXTINF:2,\nb.ts\n",
    );
    server.route("/hl/dave/2024-01-02_03-04/hi/a.ts", 200, "A");
    server.route("/hl/dave/2024-01-02_03-04/hi/b.ts", 200, "B");
    server.route(
        "/video/4/play",
        200,
        r#"<div data-token="tok4" data-video-id="4"></div>"#,
    );
    server.route("/api/video/4?token=tok4", 200, "shall_signin");

    let work = tempdir().unwrap();
    let store_path = work.path().join("config.json");
    write_store(
        &store_path,
        vec![json!(server.url("/video/3/play")), json!(server.url("/video/4/play"))],
    );
    let sink = Arc::new(JobStoreFile::open(&store_path).unwrap());
    let o = orchestrator(work.path(), Arc::clone(&sink));
    let summary = o.run_parallel(jobs(&sink)).await.unwrap();
    assert_eq!((summary.completed, summary.blocked), (1, 1));
    assert_eq!(
        std::fs::read(work.path().join("CB_dave_24-01-02_03-04.ts")).unwrap(),
        b"AB"
    );
    assert_eq!(server.hits("/hl/dave/2024-01-02_03-04/lo/index.m3u8"), 0);
    // Blocked jobs keep their entry untouched.
    assert_eq!(
        JobStore::load(&store_path).unwrap().urls[1],
        json!(server.url("/video/4/play"))
    );
}

#[tokio::test]
async fn playlist_mode_then_local_mux() {
    let server = SiteServer::start();
    server.video(9, "erin", 3);
    let work = tempdir().unwrap();
    let store_path = work.path().join("config.json");
    write_store(&store_path, vec![json!(server.url("/video/9/play"))]);
    let sink = Arc::new(JobStoreFile::open(&store_path).unwrap());
    let o = orchestrator(work.path(), Arc::clone(&sink));

    let summary = o.fetch_playlists(jobs(&sink)).await.unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(server.hits("/hl/erin/2024-01-02_03-04/seg0.ts"), 0);

    let saved = std::fs::read(work.path().join("CB_erin_24-01-02_03-04.m3u8")).unwrap();
    let manifest = recu_core::playlist::Manifest::from_text(saved, "CB_erin_24-01-02_03-04");
    assert_eq!(manifest.len(), 3);
    let out = o
        .mux_local(
            manifest,
            recu_core::mux::RangeSpec::full(),
            recu_core::mux::SampleSpec::none(),
            None,
        )
        .await
        .unwrap();
    assert!(matches!(out, recu_core::mux::MuxOutcome::Completed { path: Some(_) }));
    assert_eq!(
        std::fs::read(work.path().join("CB_erin_24-01-02_03-04.ts")).unwrap(),
        b"<9:0><9:1><9:2>"
    );
}
