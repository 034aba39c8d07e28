//! Integration tests for the Compute Engine provider client using wiremock.
//!
//! These drive the real `GcpComputeProvider` through the lifecycle engine
//! against mocked Compute endpoints, covering pagination draining,
//! aggregated-response parsing, and deletion outcome mapping.

use serde_json::json;
use std::sync::Arc;
use vminv::gcp::auth::GcpCredentials;
use vminv::gcp::compute::GcpComputeProvider;
use vminv::inventory::deletion::DeletionRequest;
use vminv::inventory::discovery::InstanceStatus;
use vminv::inventory::query::QueryConfig;
use vminv::inventory::service::LifecycleService;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> LifecycleService {
    let provider = GcpComputeProvider::with_parts(
        GcpCredentials::with_static_token("test-token"),
        format!("{}/compute/v1", server.uri()),
    )
    .expect("provider should build");
    LifecycleService::new(Arc::new(provider), "test-project")
}

fn zone_query(zone: &str) -> QueryConfig {
    QueryConfig {
        project_id: Some("test-project".to_string()),
        zone: Some(zone.to_string()),
        domain: None,
    }
}

fn delete_request(instance: &str) -> DeletionRequest {
    DeletionRequest {
        project_id: Some("test-project".to_string()),
        zone: Some("us-central1-a".to_string()),
        instance_id: Some(instance.to_string()),
    }
}

/// Zone-scoped listing follows nextPageToken until exhausted.
#[tokio::test]
async fn test_zonal_listing_drains_all_pages() {
    let server = MockServer::start().await;
    let instances_path = "/compute/v1/projects/test-project/zones/us-central1-a/instances";

    // Second page, matched by its continuation token; mounted first so the
    // untokenized first-page mock cannot shadow it.
    Mock::given(method("GET"))
        .and(path(instances_path))
        .and(query_param("pageToken", "token-page-2"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "instance-3", "status": "STOPPED",
                 "zone": "projects/test-project/zones/us-central1-a",
                 "machineType": "projects/test-project/zones/us-central1-a/machineTypes/e2-medium"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(instances_path))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "instance-1", "status": "RUNNING",
                 "zone": "projects/test-project/zones/us-central1-a",
                 "machineType": "projects/test-project/zones/us-central1-a/machineTypes/e2-medium"},
                {"name": "instance-2", "status": "RUNNING",
                 "zone": "projects/test-project/zones/us-central1-a",
                 "machineType": "projects/test-project/zones/us-central1-a/machineTypes/n1-standard-1"}
            ],
            "nextPageToken": "token-page-2"
        })))
        .mount(&server)
        .await;

    let records = service_for(&server)
        .list_instances(zone_query("us-central1-a"))
        .await
        .expect("listing should succeed");

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["instance-1", "instance-2", "instance-3"]);
    assert_eq!(records[0].zone, "us-central1-a");
    assert_eq!(records[1].machine_type, "n1-standard-1");
    assert_eq!(records[2].status, InstanceStatus::Stopped);
}

/// Aggregated listing flattens per-zone groups and skips empty zones.
#[tokio::test]
async fn test_aggregated_listing_skips_empty_zones() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/test-project/aggregated/instances"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": {
                "zones/europe-west1-d": {
                    "instances": [
                        {"name": "api-1", "status": "RUNNING",
                         "zone": "projects/test-project/zones/europe-west1-d",
                         "machineType": "projects/test-project/zones/europe-west1-d/machineTypes/e2-small"}
                    ]
                },
                "zones/us-central1-a": {
                    "warning": {"code": "NO_RESULTS_ON_PAGE"}
                },
                "zones/us-east1-b": {
                    "instances": [
                        {"name": "db-1", "status": "SUSPENDED",
                         "zone": "projects/test-project/zones/us-east1-b",
                         "machineType": "projects/test-project/zones/us-east1-b/machineTypes/n2-standard-2"}
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    // No zone in the query selects the aggregated call shape.
    let records = service_for(&server)
        .list_instances(QueryConfig {
            project_id: Some("test-project".to_string()),
            zone: None,
            domain: None,
        })
        .await
        .expect("listing should succeed");

    assert_eq!(records.len(), 2);
    let zones: Vec<&str> = records.iter().map(|r| r.zone.as_str()).collect();
    assert!(zones.contains(&"europe-west1-d"));
    assert!(zones.contains(&"us-east1-b"));
    let db = records.iter().find(|r| r.name == "db-1").unwrap();
    assert_eq!(db.status, InstanceStatus::Suspended);
}

/// Domain filtering applies on top of the provider results.
#[tokio::test]
async fn test_domain_filter_over_live_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "web-example.com", "status": "RUNNING"},
                {"name": "db-internal", "status": "RUNNING"},
                {"name": "api-example.com", "status": "RUNNING"}
            ]
        })))
        .mount(&server)
        .await;

    let mut query = zone_query("us-central1-a");
    query.domain = Some("example.com".to_string());

    let records = service_for(&server)
        .list_instances(query)
        .await
        .expect("listing should succeed");

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["web-example.com", "api-example.com"]);
}

/// A provider failure aborts the whole listing with no partial result.
#[tokio::test]
async fn test_listing_error_is_all_or_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "Backend unavailable"}
        })))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .list_instances(zone_query("us-central1-a"))
        .await
        .expect_err("listing should fail");
    assert!(!err.is_validation());
}

/// Deleting one instance issues a single DELETE and reports `deleted`.
#[tokio::test]
async fn test_single_delete_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances/my-vm"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "compute#operation",
            "status": "PENDING",
            "operationType": "delete"
        })))
        .mount(&server)
        .await;

    let outcomes = service_for(&server)
        .delete_instances(delete_request("my-vm"))
        .await
        .expect("delete should succeed");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].instance_id, "my-vm");
    assert_eq!(serde_json::to_value(outcomes[0].status).unwrap(), "deleted");
}

/// A 404 on a concrete instance is a `failed` outcome, not a request error.
#[tokio::test]
async fn test_delete_missing_instance_is_failed_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances/missing-one"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Instance not found"}
        })))
        .mount(&server)
        .await;

    let outcomes = service_for(&server)
        .delete_instances(delete_request("missing-one"))
        .await
        .expect("request should not fail");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].instance_id, "missing-one");
    assert_eq!(serde_json::to_value(outcomes[0].status).unwrap(), "failed");
}

/// Bulk deletion discovers targets first, then deletes each independently.
#[tokio::test]
async fn test_delete_all_two_phase_orchestration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "keep-failing", "status": "RUNNING"},
                {"name": "goes-away", "status": "RUNNING"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances/keep-failing"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": 409, "message": "Resource in use"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/compute/v1/projects/test-project/zones/us-central1-a/instances/goes-away"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "compute#operation", "status": "PENDING"
        })))
        .mount(&server)
        .await;

    let outcomes = service_for(&server)
        .delete_instances(delete_request("ALL"))
        .await
        .expect("bulk delete should report outcomes");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].instance_id, "keep-failing");
    assert_eq!(serde_json::to_value(outcomes[0].status).unwrap(), "failed");
    assert_eq!(outcomes[1].instance_id, "goes-away");
    assert_eq!(serde_json::to_value(outcomes[1].status).unwrap(), "deleted");
}
