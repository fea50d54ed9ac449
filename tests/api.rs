#![cfg(feature = "web")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tactic_matrix::app::{AppState, router};
use tactic_matrix::{DataStore, Dataset, JsonFileStore, Row};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

struct Fixture {
    dir: TempDir,
    app: Router,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("index.html"), "<h1>matrix</h1>").unwrap();
        fs::write(static_dir.join("app.js"), "console.log('hi');").unwrap();

        let store = JsonFileStore::new(dir.path().join("matrixData.json"));
        store
            .save(&Dataset::new(vec![
                Row::new("voting", "Voting").with_field("social", json!("Crowd review")),
                Row::new("retry", "Retry"),
            ]))
            .unwrap();

        let state = Arc::new(AppState::new(Arc::new(store)));
        let app = router(state, &static_dir);
        Fixture { dir, app }
    }

    fn data_path(&self) -> std::path::PathBuf {
        self.dir.path().join("matrixData.json")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn submit(&self, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn get_data_returns_the_whole_array() {
    let fixture = Fixture::new();
    let (status, body) = fixture.get_json("/api/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": "voting", "tactic": "Voting", "social": "Crowd review"},
            {"id": "retry", "tactic": "Retry"}
        ])
    );
}

#[tokio::test]
async fn submit_appends_and_is_visible_through_get() {
    let fixture = Fixture::new();
    let (status, body) = fixture
        .submit(r#"{"tacticId":"voting","column":"social","entry":" Peer vote ","description":"two reviewers"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "message": "Added \"Peer vote\" under Social Interface for Voting."
        })
    );

    let (_, data) = fixture.get_json("/api/data").await;
    assert_eq!(
        data,
        json!([
            {
                "id": "voting",
                "tactic": "Voting",
                "social": [
                    {"id": "crowd-review", "title": "Crowd review", "description": "", "notes": ""},
                    {"id": "peer-vote", "title": "Peer vote", "description": "two reviewers", "notes": ""}
                ]
            },
            {"id": "retry", "tactic": "Retry"}
        ])
    );
}

#[tokio::test]
async fn legacy_tactic_field_is_accepted() {
    let fixture = Fixture::new();
    let (status, body) = fixture
        .submit(r#"{"tactic":"retry","column":"physical","entry":"Spare unit"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Added \"Spare unit\" under Physical for Retry."
    );
}

#[tokio::test]
async fn invalid_fields_are_400_and_file_is_unchanged() {
    let fixture = Fixture::new();
    let before = read(&fixture.data_path());

    for payload in [
        r#"{"tacticId":"voting","column":"network","entry":"x"}"#,
        r#"{"tacticId":"voting","column":"data","entry":"   "}"#,
        r#"{"column":"data","entry":"x"}"#,
        r#"{}"#,
        r#"[1,2,3]"#,
        r#"["retry","","physical","Spare",null]"#,
        r#"{"tacticId":5,"column":"data","entry":"x"}"#,
        "not json",
    ] {
        let (status, body) = fixture.submit(payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, json!({"error": "Missing or invalid fields"}));
    }

    assert_eq!(read(&fixture.data_path()), before);
}

#[tokio::test]
async fn unknown_row_is_404_and_file_is_unchanged() {
    let fixture = Fixture::new();
    let before = read(&fixture.data_path());

    let (status, body) = fixture
        .submit(r#"{"tacticId":"ghost","column":"data","entry":"x"}"#)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Tactic id not found: ghost"}));

    assert_eq!(read(&fixture.data_path()), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_are_all_kept() {
    let fixture = Fixture::new();

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = fixture.app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"tacticId":"retry","column":"data","entry":"Item {}"}}"#, i);
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();
            app.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, data) = fixture.get_json("/api/data").await;
    assert_eq!(data[1]["data"].as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn get_data_serves_rows_it_cannot_parse() {
    let fixture = Fixture::new();
    fs::write(fixture.data_path(), r#"[{"id":"a","social":"x"}, "stray"]"#).unwrap();

    let (status, body) = fixture.get_json("/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": "a", "social": "x"}, "stray"]));
}

#[tokio::test]
async fn static_files_are_served() {
    let fixture = Fixture::new();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = fixture.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>matrix</h1>");

    let request = Request::builder().uri("/app.js").body(Body::empty()).unwrap();
    let (status, body) = fixture.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('hi');");

    let request = Request::builder().uri("/missing.css").body(Body::empty()).unwrap();
    let (status, _) = fixture.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
