//! Integration tests for the employer dashboard cache

use jobboard_core::ManualClock;
use jobboard_core::config::CacheConfig;
use jobboard_http::client::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use jobboard_http::types::{ApplicationStatus, EmployerUpdate, JobCreate};
use jobboard_http::{EmployerDashboard, MemoryTokenStore, SessionClient, TokenStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TTL: Duration = Duration::from_secs(60);

fn dashboard(server: &MockServer, clock: Arc<ManualClock>) -> EmployerDashboard {
    let store = Arc::new(MemoryTokenStore::new());
    store.set(ACCESS_TOKEN_KEY, "t1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    let client = SessionClient::builder()
        .base_url(server.uri())
        .token_store(store)
        .clock(clock.clone())
        .build()
        .unwrap();

    EmployerDashboard::new(client, &CacheConfig { ttl_secs: TTL.as_secs() }, clock)
}

fn employer_json(name: &str) -> serde_json::Value {
    json!({"id": "e1", "company_name": name, "email": "hr@acme.test"})
}

fn job_json(id: &str) -> serde_json::Value {
    json!({"id": id, "employer_id": "e1", "title": "Engineer", "description": "Build things"})
}

fn application_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "job_id": "j1",
        "applicant_name": "Ada",
        "applicant_email": "ada@example.test",
        "status": status
    })
}

async fn mount_employer(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/employers/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employer_json("Acme")))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_repeated_reads_hit_cache() {
    let mock_server = MockServer::start().await;
    mount_employer(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json("j1")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    for _ in 0..3 {
        let jobs = dashboard.jobs().await.unwrap();
        assert_eq!(jobs[0].id, "j1");
    }
    assert_eq!(dashboard.employer().await.unwrap().company_name, "Acme");
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    let mock_server = MockServer::start().await;
    mount_employer(&mock_server, 2).await;

    let clock = Arc::new(ManualClock::new(0));
    let dashboard = dashboard(&mock_server, clock.clone());

    dashboard.employer().await.unwrap();
    clock.advance(TTL - Duration::from_secs(1));
    dashboard.employer().await.unwrap();
    clock.advance(Duration::from_secs(1));
    dashboard.employer().await.unwrap();
}

#[tokio::test]
async fn test_create_job_invalidates_job_list() {
    let mock_server = MockServer::start().await;
    mount_employer(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_json("j1")])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([job_json("j1"), job_json("j2")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_json("j2")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    assert_eq!(dashboard.jobs().await.unwrap().len(), 1);
    dashboard
        .create_job(&JobCreate {
            title: "Engineer".into(),
            description: "Build things".into(),
            ..JobCreate::default()
        })
        .await
        .unwrap();
    assert_eq!(dashboard.jobs().await.unwrap().len(), 2);
    assert_eq!(dashboard.jobs().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_change_invalidates_applications_of_that_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/applications/job/j1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([application_json("a1", "pending")])),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/applications/job/j1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([application_json("a1", "hired")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/applications/a1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(application_json("a1", "hired")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    let before = dashboard.applications("j1").await.unwrap();
    assert_eq!(before[0].status, ApplicationStatus::Pending);

    dashboard
        .update_application_status("a1", ApplicationStatus::Hired)
        .await
        .unwrap();

    let after = dashboard.applications("j1").await.unwrap();
    assert_eq!(after[0].status, ApplicationStatus::Hired);
}

#[tokio::test]
async fn test_profile_update_replaces_cached_employer() {
    let mock_server = MockServer::start().await;
    mount_employer(&mock_server, 1).await;

    Mock::given(method("PUT"))
        .and(path("/employers/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employer_json("Acme Corp")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    assert_eq!(dashboard.employer().await.unwrap().company_name, "Acme");
    dashboard
        .update_profile(&EmployerUpdate {
            company_name: Some("Acme Corp".into()),
            contact_info: None,
        })
        .await
        .unwrap();
    assert_eq!(dashboard.employer().await.unwrap().company_name, "Acme Corp");
}

#[tokio::test]
async fn test_clear_forces_refetch() {
    let mock_server = MockServer::start().await;
    mount_employer(&mock_server, 2).await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    dashboard.employer().await.unwrap();
    dashboard.clear().await;
    dashboard.employer().await.unwrap();
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/employers/me"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_employer(&mock_server, 1).await;

    let dashboard = dashboard(&mock_server, Arc::new(ManualClock::new(0)));

    assert!(dashboard.employer().await.is_err());
    assert_eq!(dashboard.employer().await.unwrap().company_name, "Acme");
}
