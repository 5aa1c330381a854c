mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use cssd_api::resources::Resource;
use serde_json::json;

#[tokio::test]
async fn status_change_is_validated_and_persisted() {
    let app = TestApp::new().await;
    app.write_collection(
        Resource::Requests,
        json!([{"id": "REQ001", "status": "Pending", "priority": "High"}]),
    );

    let response = app
        .request(
            Method::POST,
            "/api/requestManagementData/REQ001/status",
            Some(json!({"status": "Processing"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "Processing");
    assert_eq!(
        app.read_collection(Resource::Requests)[0]["status"],
        "Processing"
    );

    let rejected = app
        .request(
            Method::POST,
            "/api/requestManagementData/REQ001/status",
            Some(json!({"status": "Shipped"})),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let body = response_json(rejected).await;
    assert!(body["error"].as_str().unwrap().contains("Shipped"));
    assert_eq!(
        app.read_collection(Resource::Requests)[0]["status"],
        "Processing"
    );
}

#[tokio::test]
async fn status_change_requires_a_status_string() {
    let app = TestApp::new().await;
    app.write_collection(Resource::Requests, json!([{"id": "REQ001"}]));

    let response = app
        .request(
            Method::POST,
            "/api/requestManagementData/REQ001/status",
            Some(json!({"state": "Processing"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_change_on_unknown_id_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/issueItemData/ISS404/status",
            Some(json!({"status": "Issued"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(response).await, json!({"error": "Item not found."}));
}

#[tokio::test]
async fn completing_sterilization_stamps_end_time() {
    let app = TestApp::new().await;
    app.write_collection(
        Resource::SterilizationProcesses,
        json!([{"id": "STE001", "itemId": "REQ001", "machine": "Autoclave 1", "status": "In Progress", "endTime": ""}]),
    );

    let response = app
        .request(
            Method::POST,
            "/api/sterilizationProcessData/STE001/status",
            Some(json!({"status": "Completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let record = response_json(response).await;
    assert_eq!(record["status"], "Completed");
    let end_time = record["endTime"].as_str().unwrap();
    assert_eq!(end_time.len(), 5);
    assert_eq!(&end_time[2..3], ":");
}

#[tokio::test]
async fn workflow_advances_stage_by_stage() {
    let app = TestApp::new().await;
    app.write_collection(
        Resource::WorkflowEntries,
        json!([{"id": "WF001", "requestId": "REQ001", "currentStatus": "Sterilized", "timestamp": "2024-06-10T08:00:00Z", "location": "CSSD"}]),
    );

    let first = app
        .request(Method::POST, "/api/workflowTrackingData/WF001/advance", None)
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let record = response_json(first).await;
    assert_eq!(record["currentStatus"], "Issued");
    assert_ne!(record["timestamp"], "2024-06-10T08:00:00Z");

    let second = app
        .request(Method::POST, "/api/workflowTrackingData/WF001/advance", None)
        .await;
    assert_eq!(response_json(second).await["currentStatus"], "Returned");

    let done = app
        .request(Method::POST, "/api/workflowTrackingData/WF001/advance", None)
        .await;
    assert_eq!(done.status(), StatusCode::CONFLICT);
    assert!(response_json(done).await["error"].is_string());

    assert_eq!(
        app.read_collection(Resource::WorkflowEntries)[0]["currentStatus"],
        "Returned"
    );
}

#[tokio::test]
async fn advance_exists_only_for_workflow() {
    let app = TestApp::new().await;
    app.write_collection(Resource::Requests, json!([{"id": "REQ001", "status": "Pending"}]));

    let response = app
        .request(Method::POST, "/api/requestManagementData/REQ001/advance", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
