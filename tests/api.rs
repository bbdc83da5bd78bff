//! HTTP-level tests against an in-memory database

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use actunews::api::{build_router, AppState};
use actunews::db::{create_test_pool, migrations};
use actunews::lifecycle::LifecyclePipeline;
use actunews::services::{
    Argon2CredentialHasher, CredentialHasher, DeliveryError, MailQueue, MailWorker, Notifier,
    OutboundEmail, WelcomeMessage,
};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(OutboundEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        });
        Ok(())
    }
}

async fn setup() -> (TestServer, MailWorker) {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher::new());
    let (queue, worker) = MailQueue::new(16);
    let pipeline = Arc::new(LifecyclePipeline::standard(
        hasher,
        queue,
        WelcomeMessage::default(),
    ));

    let state = AppState::new(pool, pipeline);
    let server = TestServer::new(build_router(state, "http://localhost:3000"))
        .expect("Failed to start test server");

    (server, worker)
}

async fn create_user(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "email": email,
            "firstname": "Jane",
            "lastname": "Doe",
            "password": "p@ss"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_category(server: &TestServer, name: &str) -> Value {
    let response = server
        .post("/api/v1/categories")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn health_reports_ok() {
    let (server, _worker) = setup().await;

    let response = server.get("/api/v1/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn user_registration_hides_password_and_sends_welcome() {
    let (server, worker) = setup().await;

    let user = create_user(&server, "jane@actu.news").await;

    assert!(user.get("password").is_none());
    assert_eq!(user["roles"], json!(["ROLE_USER"]));

    let fetched = server.get(&format!("/api/v1/users/{}", user["id"])).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["email"], "jane@actu.news");

    drop(server);
    let notifier = Arc::new(RecordingNotifier::default());
    let stats = worker.run(notifier.clone()).await;

    assert_eq!(stats.delivered, 1);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent[0].to, "jane@actu.news");
    assert_eq!(sent[0].subject, "Bienvenue sur notre site Actunews !");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (server, _worker) = setup().await;
    create_user(&server, "jane@actu.news").await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "email": "jane@actu.news",
            "firstname": "Jane",
            "lastname": "Again",
            "password": "other"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn overlong_password_is_unprocessable() {
    let (server, _worker) = setup().await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({
            "email": "jane@actu.news",
            "firstname": "Jane",
            "lastname": "Doe",
            "password": "a".repeat(5000)
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["code"], "UNPROCESSABLE");
}

#[tokio::test]
async fn category_alias_is_derived_and_kept_on_rename() {
    let (server, _worker) = setup().await;

    let category = server
        .post("/api/v1/categories")
        .json(&json!({ "name": "Politique", "alias": "forced" }))
        .await;
    category.assert_status(StatusCode::CREATED);
    let category = category.json::<Value>();
    assert_eq!(category["alias"], "politique");

    let renamed = server
        .put(&format!("/api/v1/categories/{}", category["id"]))
        .json(&json!({ "name": "Vie politique" }))
        .await;

    renamed.assert_status_ok();
    let renamed = renamed.json::<Value>();
    assert_eq!(renamed["name"], "Vie politique");
    assert_eq!(renamed["alias"], "politique");
}

#[tokio::test]
async fn post_lifecycle_over_http() {
    let (server, _worker) = setup().await;
    let user = create_user(&server, "author@actu.news").await;
    let category = create_category(&server, "Monde").await;
    let tag = server
        .post("/api/v1/tags")
        .json(&json!({ "name": "Europe" }))
        .await
        .json::<Value>();

    let created = server
        .post("/api/v1/posts")
        .json(&json!({
            "title": "Breaking News: Big Event",
            "content": "Le contenu",
            "image": "cover.jpg",
            "user_id": user["id"],
            "category_id": category["id"],
            "tag_ids": [tag["id"]]
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let post = created.json::<Value>();
    assert_eq!(post["alias"], "breaking-news-big-event");
    let post_id = post["id"].as_i64().unwrap();

    let comment = server
        .post("/api/v1/comments")
        .json(&json!({
            "post_id": post_id,
            "user_id": user["id"],
            "content": "Bravo"
        }))
        .await;
    comment.assert_status(StatusCode::CREATED);
    let comment_id = comment.json::<Value>()["id"].as_i64().unwrap();

    let detail = server.get(&format!("/api/v1/posts/{}", post_id)).await;
    detail.assert_status_ok();
    let detail = detail.json::<Value>();
    assert_eq!(detail["tag_ids"], json!([tag["id"]]));
    assert_eq!(detail["comments"][0]["content"], "Bravo");

    let list = server.get("/api/v1/posts").await.json::<Value>();
    assert_eq!(list["posts"].as_array().unwrap().len(), 1);

    server
        .delete(&format!("/api/v1/posts/{}", post_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/v1/comments/{}", comment_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/v1/posts/{}", post_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_validation_and_missing_references() {
    let (server, _worker) = setup().await;
    let user = create_user(&server, "author@actu.news").await;

    let blank = server
        .post("/api/v1/posts")
        .json(&json!({
            "title": "",
            "content": "C",
            "image": "i.jpg",
            "user_id": user["id"],
            "category_id": 1
        }))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        blank.json::<Value>()["error"]["message"],
        "N'oubliez pas votre titre."
    );

    let missing_category = server
        .post("/api/v1/posts")
        .json(&json!({
            "title": "T",
            "content": "C",
            "image": "i.jpg",
            "user_id": user["id"],
            "category_id": 999
        }))
        .await;
    missing_category.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn names_without_alias_characters_are_rejected() {
    let (server, _worker) = setup().await;
    let user = create_user(&server, "author@actu.news").await;
    let category = create_category(&server, "Monde").await;

    let response = server
        .post("/api/v1/categories")
        .json(&json!({ "name": "日本語" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "N'oubliez pas votre alias."
    );

    let response = server
        .post("/api/v1/posts")
        .json(&json!({
            "title": "!!!",
            "content": "C",
            "image": "i.jpg",
            "user_id": user["id"],
            "category_id": category["id"]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let categories = server.get("/api/v1/categories").await.json::<Value>();
    assert_eq!(categories["categories"].as_array().unwrap().len(), 1);
    let posts = server.get("/api/v1/posts").await.json::<Value>();
    assert!(posts["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (server, _worker) = setup().await;

    for path in [
        "/api/v1/users/42",
        "/api/v1/posts/42",
        "/api/v1/categories/42",
        "/api/v1/tags/42",
        "/api/v1/comments/42",
    ] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
    }

    server
        .delete("/api/v1/comments/42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_are_listed_by_name() {
    let (server, _worker) = setup().await;

    for name in ["Santé", "Budget"] {
        server
            .post("/api/v1/tags")
            .json(&json!({ "name": name }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let tags = server.get("/api/v1/tags").await.json::<Value>();
    let names: Vec<&str> = tags["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["Budget", "Santé"]);
}
