//! HTTP API integration tests driven through the router with `oneshot`.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

use sp_api::create_router;
use sp_common::{RefreshPriority, TableDescriptor, TableRole};
use sp_config::AuthTokens;
use sp_publisher::{ContentPublisher, PublishError, SheetSource, TablePublisher};
use sp_sheets::SheetsError;

const ADMIN_TOKEN: &str = "admin-secret";
const VIEWER_TOKEN: &str = "viewer-secret";

/// Sheet source backed by a fixed row map; unknown tables fail upstream.
struct FakeSource {
    tables: HashMap<String, Vec<Vec<String>>>,
}

#[async_trait]
impl SheetSource for FakeSource {
    async fn fetch_table(&self, table: &str) -> Result<Vec<Vec<String>>, PublishError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| PublishError::Sheets(SheetsError::NoData(table.to_string())))
    }
}

/// Publisher that records every committed file.
#[derive(Default)]
struct FakePublisher {
    commits: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl ContentPublisher for FakePublisher {
    async fn publish_file(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<(), PublishError> {
        self.commits.lock().unwrap().push((
            path.to_string(),
            content.to_string(),
            commit_message.to_string(),
        ));
        Ok(())
    }
}

fn test_tables() -> Vec<TableDescriptor> {
    vec![
        TableDescriptor::new("menu", RefreshPriority::Daily, TableRole::Editor),
        TableDescriptor::new("reviews", RefreshPriority::Weekly, TableRole::Editor),
        TableDescriptor {
            name: "legacy".to_string(),
            priority: RefreshPriority::Weekly,
            role_required: TableRole::Admin,
            active: false,
        },
    ]
}

fn sample_rows() -> Vec<Vec<String>> {
    vec![
        vec!["name".to_string(), "price".to_string()],
        vec!["Borscht".to_string(), "120".to_string()],
        vec!["Varenyky".to_string(), "95".to_string()],
    ]
}

fn build_app() -> (Router, Arc<FakePublisher>) {
    let mut tables = HashMap::new();
    tables.insert("menu".to_string(), sample_rows());
    tables.insert("reviews".to_string(), sample_rows());

    let publisher = Arc::new(FakePublisher::default());
    let table_publisher = Arc::new(TablePublisher::new(
        Arc::new(FakeSource { tables }),
        publisher.clone(),
    ));

    let tokens = Arc::new(AuthTokens {
        admin_token: ADMIN_TOKEN.to_string(),
        viewer_token: VIEWER_TOKEN.to_string(),
    });

    let router = create_router(tokens, Arc::new(test_tables()), table_publisher);
    (router, publisher)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = build_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn config_requires_token() {
    let (app, _) = build_app();
    let response = app
        .oneshot(Request::builder().uri("/config.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn viewer_can_list_config() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/config.json?token={}", VIEWER_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let tables = body.as_array().unwrap();
    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0]["name"], "menu");
    assert_eq!(tables[0]["priority"], "daily");
    assert_eq!(tables[0]["role_required"], "editor");
}

#[tokio::test]
async fn admin_token_also_lists_config() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/config.json?token={}", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/config.json")
                .header("Authorization", format!("Bearer {}", VIEWER_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn viewer_cannot_publish() {
    let (app, publisher) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish?token={}&table=menu", VIEWER_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(publisher.commits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn admin_publishes_single_table() {
    let (app, publisher) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish?token={}&table=menu", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["table"], "menu");
    assert_eq!(body["rows"], 2);

    let commits = publisher.commits.lock().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].0, "menu.json");
    assert_eq!(commits[0].2, "Update menu.json from admin panel");

    let records: Value = serde_json::from_str(&commits[0].1).unwrap();
    assert_eq!(records[0]["name"], "Borscht");
    assert_eq!(records[0]["price"], "120");
}

#[tokio::test]
async fn publish_requires_table_parameter() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish?token={}", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn publish_unknown_table_is_404() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish?token={}&table=nope", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn publish_failure_returns_500_with_details() {
    let (app, _) = build_app();
    // "legacy" is registered but the fixture source has no rows for it
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish?token={}&table=legacy", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["table"], "legacy");
    assert!(body["message"].as_str().unwrap().contains("legacy"));
}

#[tokio::test]
async fn publish_all_covers_active_tables_only() {
    let (app, publisher) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish-all?token={}", ADMIN_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["published"], 2);
    assert_eq!(body["failed"], 0);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["table"], "menu");
    assert_eq!(results[1]["table"], "reviews");

    let commits = publisher.commits.lock().unwrap();
    assert_eq!(commits.len(), 2);
    assert!(commits.iter().all(|(_, _, msg)| msg.ends_with("- batch publish")));
}

#[tokio::test]
async fn publish_all_requires_admin() {
    let (app, _) = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/publish-all?token={}", VIEWER_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (app, _) = build_app();
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
