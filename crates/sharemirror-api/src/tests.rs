//! In-process HTTP tests against in-memory stores and shares.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use sharemirror_core::config::RemoteConfig;
use sharemirror_database::MemoryStore;
use sharemirror_remote::MemoryShareConnector;
use sharemirror_service::MirrorService;
use sharemirror_worker::JobQueue;

use crate::router::build_router;
use crate::state::AppState;

const SERVER: &str = "pacs01";
const SHARE: &str = "exports";

struct TestApp {
    router: Router,
    remote: MemoryShareConnector,
    jobs: Arc<JobQueue>,
}

struct TestResponse {
    status: StatusCode,
    body: Value,
    raw: Vec<u8>,
}

impl TestApp {
    async fn new() -> Self {
        Self::build(true).await
    }

    /// App whose background worker is turned off.
    async fn without_worker() -> Self {
        Self::build(false).await
    }

    async fn build(worker_enabled: bool) -> Self {
        let store = MemoryStore::new();
        let remote = MemoryShareConnector::new();
        remote.add_share(SERVER, SHARE).await;
        let mirror = Arc::new(MirrorService::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(remote.clone()),
            RemoteConfig::default(),
        ));
        let jobs = Arc::new(JobQueue::new(3));
        let queue = worker_enabled.then(|| Arc::clone(&jobs));
        let router = build_router(AppState::new(mirror, queue));
        Self {
            router,
            remote,
            jobs,
        }
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(
                body.map(|b| b.to_string()).unwrap_or_default(),
            ))
            .unwrap();

        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap()
            .to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        TestResponse { status, body, raw }
    }

    async fn create_location(&self) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/locations",
                Some(json!({
                    "name": "Radiology",
                    "server_name": SERVER,
                    "share_name": SHARE,
                    "user_id": "svc",
                    "password": "pw",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["data"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Node id of `name` directly under the location root.
    async fn child_id(&self, location_id: Uuid, name: &str) -> String {
        let tree = self
            .request("GET", &format!("/api/locations/{location_id}/tree"), None)
            .await;
        tree.body["children"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["text"] == name)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["pending_jobs"], 0);
}

#[tokio::test]
async fn test_create_and_list_root_views() {
    let app = TestApp::new().await;
    let id = app.create_location().await;

    let response = app.request("GET", "/api/locations", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([{
            "id": response.body[0]["id"],
            "text": "Radiology",
            "children": true,
            "icon": "folder",
        }])
    );

    let status = app.request("GET", &format!("/api/locations/{id}"), None).await;
    assert_eq!(status.body["data"]["connected"], true);
    assert!(status.body["data"]["location"].get("password").is_none());
}

#[tokio::test]
async fn test_create_rejects_blank_and_duplicate() {
    let app = TestApp::new().await;
    app.create_location().await;

    let duplicate = app
        .request(
            "POST",
            "/api/locations",
            Some(json!({
                "name": "Radiology",
                "server_name": "pacs02",
                "share_name": SHARE,
                "user_id": "svc",
                "password": "pw",
            })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "CONFLICT");

    let blank = app
        .request(
            "POST",
            "/api/locations",
            Some(json!({
                "name": "",
                "server_name": "pacs03",
                "share_name": SHARE,
                "user_id": "svc",
                "password": "pw",
            })),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sync_then_browse() {
    let app = TestApp::new().await;
    app.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
    app.remote.add_file(SERVER, SHARE, "./scan.dcm", &b"s"[..]).await;
    let id = app.create_location().await;

    let sync = app
        .request("POST", &format!("/api/locations/{id}/sync"), None)
        .await;
    assert_eq!(sync.status, StatusCode::OK);
    assert_eq!(sync.body["data"]["nodes_created"], 3);
    assert_eq!(sync.body["data"]["root_listed"], true);

    let tree = app
        .request("GET", &format!("/api/locations/{id}/tree"), None)
        .await;
    assert_eq!(tree.body["text"], "Radiology");
    assert_eq!(tree.body["children"][0]["text"], "reports");
    assert_eq!(tree.body["children"][0]["children"][0]["text"], "a.dcm");
    assert_eq!(tree.body["children"][1]["icon"], "dicom available notimported");

    let reports = app.child_id(id, "reports").await;
    let lazy = app
        .request("GET", &format!("/api/nodes/{reports}/view"), None)
        .await;
    assert_eq!(lazy.body["children"], true);
    let deep = app
        .request("GET", &format!("/api/nodes/{reports}/view?lazy=false"), None)
        .await;
    assert_eq!(deep.body["children"][0]["text"], "a.dcm");
}

#[tokio::test]
async fn test_node_sync_is_lazy_by_default() {
    let app = TestApp::new().await;
    app.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
    let id = app.create_location().await;

    let roots = app.request("GET", "/api/locations", None).await;
    let root = roots.body[0]["id"].as_str().unwrap().to_string();

    let sync = app
        .request("POST", &format!("/api/nodes/{root}/sync"), None)
        .await;
    assert_eq!(sync.status, StatusCode::OK);
    assert_eq!(sync.body["data"]["lazy"], true);
    assert_eq!(sync.body["data"]["nodes_created"], 1);

    let tree = app
        .request("GET", &format!("/api/locations/{id}/tree"), None)
        .await;
    assert_eq!(tree.body["children"][0]["children"], true);
}

#[tokio::test]
async fn test_content_and_availability() {
    let app = TestApp::new().await;
    app.remote.add_file(SERVER, SHARE, "./scan.dcm", &b"DICM"[..]).await;
    let id = app.create_location().await;
    app.request("POST", &format!("/api/locations/{id}/sync"), None)
        .await;
    let scan = app.child_id(id, "scan.dcm").await;

    let available = app
        .request("GET", &format!("/api/nodes/{scan}/available"), None)
        .await;
    assert_eq!(available.body["data"]["available"], true);

    let content = app
        .request("GET", &format!("/api/nodes/{scan}/content"), None)
        .await;
    assert_eq!(content.status, StatusCode::OK);
    assert_eq!(content.raw, b"DICM");

    app.remote.set_reachable(SERVER, false).await;
    let offline = app
        .request("GET", &format!("/api/nodes/{scan}/content"), None)
        .await;
    assert_eq!(offline.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(offline.body["error"], "REMOTE_UNAVAILABLE");
    let gone = app
        .request("GET", &format!("/api/nodes/{scan}/available"), None)
        .await;
    assert_eq!(gone.body["data"]["available"], false);
}

#[tokio::test]
async fn test_list_all_paths() {
    let app = TestApp::new().await;
    app.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
    let id = app.create_location().await;

    let paths = app
        .request("GET", &format!("/api/locations/{id}/paths"), None)
        .await;
    assert_eq!(paths.body["data"], json!(["./reports/a.dcm"]));

    app.remote.set_reachable(SERVER, false).await;
    let offline = app
        .request("GET", &format!("/api/locations/{id}/paths"), None)
        .await;
    assert_eq!(offline.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(offline.body["error"], "REMOTE_UNAVAILABLE");
}

#[tokio::test]
async fn test_background_sync_enqueues_job() {
    let app = TestApp::new().await;
    let id = app.create_location().await;

    let accepted = app
        .request(
            "POST",
            &format!("/api/locations/{id}/sync?background=true"),
            None,
        )
        .await;
    assert_eq!(accepted.status, StatusCode::ACCEPTED);
    assert_eq!(accepted.body["data"]["job_type"], "sync_location");
    assert_eq!(app.jobs.pending(), 1);
}

#[tokio::test]
async fn test_background_sync_without_worker_is_unavailable() {
    let app = TestApp::without_worker().await;
    let id = app.create_location().await;
    let roots = app.request("GET", "/api/locations", None).await;
    let root = roots.body[0]["id"].as_str().unwrap().to_string();

    for path in [
        format!("/api/locations/{id}/sync?background=true"),
        format!("/api/nodes/{root}/sync?background=true"),
    ] {
        let response = app.request("POST", &path, None).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE, "{path}");
        assert_eq!(response.body["error"], "SERVICE_UNAVAILABLE");
    }
    assert_eq!(app.jobs.pending(), 0);

    let inline = app
        .request("POST", &format!("/api/locations/{id}/sync"), None)
        .await;
    assert_eq!(inline.status, StatusCode::OK);

    let health = app.request("GET", "/api/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.body["data"]["pending_jobs"].is_null());
}

#[tokio::test]
async fn test_unknown_ids_and_delete() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();
    for (method, path) in [
        ("GET", format!("/api/nodes/{missing}/view")),
        ("POST", format!("/api/nodes/{missing}/sync")),
        ("POST", format!("/api/locations/{missing}/sync")),
        ("GET", format!("/api/locations/{missing}/tree")),
    ] {
        let response = app.request(method, &path, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {path}");
    }

    let id = app.create_location().await;
    let deleted = app
        .request("DELETE", &format!("/api/locations/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let again = app
        .request("DELETE", &format!("/api/locations/{id}"), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}
