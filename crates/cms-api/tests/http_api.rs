/// Integration test: drive the full router over in-memory SQLite and a temp
/// content directory, checking status codes and JSON bodies end to end.
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cms_api::blobs::ContentBlobs;
use cms_api::credentials::CredentialStore;
use cms_api::documents::DocumentStore;
use cms_api::routes::router;
use cms_api::state::AppStateInner;
use cms_db::Database;

struct TestApp {
    _dir: tempfile::TempDir,
    router: Router,
    credentials: CredentialStore,
}

async fn app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Database::open_in_memory().unwrap());
    let blobs = ContentBlobs::new(dir.path().join("docs")).await.unwrap();

    let credentials = CredentialStore::new(db.clone());
    let state = Arc::new(AppStateInner {
        credentials: credentials.clone(),
        documents: DocumentStore::new(db, blobs),
    });

    TestApp {
        _dir: dir,
        router: router(state),
        credentials,
    }
}

fn basic(handle: &str, password: &str) -> String {
    let inner = format!("{}:{}", B64.encode(handle), password);
    format!("Basic {}", B64.encode(inner))
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        auth: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(&self, handle: &str, password: &str) -> StatusCode {
        self.call(
            "POST",
            "/api/signup",
            None,
            Some(json!({ "handle": handle, "password": password })),
        )
        .await
        .0
    }

    async fn upload(
        &self,
        auth: &str,
        title: &str,
        draft: bool,
        archived: bool,
        body: &str,
    ) -> i64 {
        let (status, value) = self
            .call(
                "POST",
                "/api/work/upload",
                Some(auth.to_string()),
                Some(json!({
                    "title": title,
                    "tags": ["rust", "notes"],
                    "draft": draft,
                    "archived": archived,
                    "body": body,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        value["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn signup_login_and_change_password() {
    let app = app().await;

    assert_eq!(app.signup("alice", "first-pass").await, StatusCode::OK);
    assert_eq!(app.signup("alice", "other").await, StatusCode::CONFLICT);

    let (status, _) = app
        .call("POST", "/api/login", Some(basic("alice", "first-pass")), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("POST", "/api/login", Some(basic("alice", "nope")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    // format errors look exactly like credential errors
    let (status, body) = app.call("POST", "/api/login", Some("Bearer xyz".into()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = app
        .call(
            "POST",
            "/api/change-password",
            Some(basic("alice", "first-pass")),
            Some(json!({ "password": "second-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call("POST", "/api/login", Some(basic("alice", "second-pass")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app().await;

    let (status, _) = app
        .call("POST", "/api/signup", None, Some(json!({ "handle": "bob" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", "/api/signup", None, Some(json!({ "handle": "", "password": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.signup("bob", "pw").await;
    let (status, _) = app
        .call(
            "POST",
            "/api/work/upload",
            Some(basic("bob", "pw")),
            Some(json!({ "title": "missing everything else" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_lifecycle_and_visibility() {
    let app = app().await;
    app.signup("alice", "pw").await;
    let auth = basic("alice", "pw");

    let public = app.upload(&auth, "Hello", false, false, "# Hello").await;
    let draft = app.upload(&auth, "WIP", true, false, "secret draft").await;

    // anonymous listing only shows the published post
    let (status, body) = app.call("GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], public);
    assert_eq!(posts[0]["tags"], json!(["rust", "notes"]));
    assert!(posts[0].get("draft").is_none());

    // authenticated listing shows everything
    let (_, body) = app.call("GET", "/api/work/posts", Some(auth.clone()), None).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["posts"][1]["author_handle"], "alice");
    assert_eq!(body["posts"][1]["draft"], true);

    // a hidden body is indistinguishable from a missing one
    let (status, body) = app
        .call("POST", "/api/posts/get-body", None, Some(json!({ "id": public })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"], "# Hello");
    let (status, _) = app
        .call("POST", "/api/posts/get-body", None, Some(json!({ "id": draft })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call("POST", "/api/work/get-body", Some(auth.clone()), Some(json!({ "id": draft })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"], "secret draft");

    // publish the draft and rewrite its body
    let (status, _) = app
        .call(
            "POST",
            "/api/work/modify",
            Some(auth.clone()),
            Some(json!({ "id": draft, "draft": false, "body": "final" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .call("POST", "/api/posts/get-body", None, Some(json!({ "id": draft })))
        .await;
    assert_eq!(body["body"], "final");

    // delete, then everything about the post is gone
    let (status, _) = app
        .call("POST", "/api/work/delete", Some(auth.clone()), Some(json!({ "id": public })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call("POST", "/api/work/delete", Some(auth.clone()), Some(json!({ "id": public })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call("POST", "/api/work/get-body", Some(auth.clone()), Some(json!({ "id": public })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("POST", "/api/work/modify", Some(auth), Some(json!({ "id": public, "title": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = app().await;
    app.signup("alice", "pw").await;
    let auth = basic("alice", "pw");

    let (status, _) = app
        .call("POST", "/api/posts/get-body", None, Some(json!({ "id": 0 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("POST", "/api/work/delete", Some(auth.clone()), Some(json!({ "id": -1 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("POST", "/api/work/modify", Some(auth), Some(json!({ "id": -1, "draft": true })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn work_routes_require_auth() {
    let app = app().await;

    let (status, _) = app.call("GET", "/api/work/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call("POST", "/api/work/delete", Some(basic("ghost", "pw")), Some(json!({ "id": 1 })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = app().await;
    app.credentials.ensure_admin("root", "rootpw").await.unwrap();
    app.signup("alice", "pw").await;

    let (status, _) = app.call("GET", "/api/admin/users", Some(basic("alice", "pw")), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("GET", "/api/admin/users", Some(basic("root", "rootpw")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handles"], json!(["root", "alice"]));
}
