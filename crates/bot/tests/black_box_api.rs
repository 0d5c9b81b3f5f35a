use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use keydrop_auth::JwtClaims;
use keydrop_bot::config::BotConfig;
use keydrop_core::{ActorId, RoleId};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";
const ADMIN_ROLE: u64 = 900;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_catalog_at("product_links.json").await
    }

    /// `relative` is resolved inside the server's private temp dir.
    async fn spawn_with_catalog_at(relative: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let catalog_path = dir.path().join(relative);
        let catalog_path = catalog_path.to_string_lossy().into_owned();
        let admin_role = ADMIN_ROLE.to_string();

        let config = BotConfig::from_lookup(|key| match key {
            "KEYDROP_ADMIN_ROLE_ID" => Some(admin_role.clone()),
            "KEYDROP_CATALOG_PATH" => Some(catalog_path.clone()),
            "KEYDROP_JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("valid test config");

        // Same router as prod, bound to an ephemeral port.
        let services = keydrop_bot::app::services::build_services(&config).expect("catalog loads");
        let app = keydrop_bot::app::build_app(Arc::new(services), JWT_SECRET.as_bytes());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _dir: dir,
        }
    }

    fn data_dir(&self) -> &std::path::Path {
        self._dir.path()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(actor: u64, roles: Vec<RoleId>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: ActorId::new(actor),
        roles,
        issued_at: now - ChronoDuration::seconds(1),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin_token() -> String {
    mint_jwt(1, vec![RoleId::new(ADMIN_ROLE)])
}

fn member_token(id: u64) -> String {
    mint_jwt(id, Vec::new())
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/products"))
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(mint_jwt(1, Vec::new()).replace('.', "x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reports_admin_capability() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).bearer_auth(admin_token()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["actor_id"], "1");
    assert_eq!(body["is_admin"], true);

    let res = client.get(srv.url("/whoami")).bearer_auth(member_token(7)).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn listing_is_public_and_explicit_when_empty() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["empty"], true);
    assert!(body["message"].is_string());

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyB", "link": "http://x/b"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client.get(srv.url("/products")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["products"], json!(["KeyA", "KeyB"]));
}

#[tokio::test]
async fn register_validates_and_reports_replacement() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "  ", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(member_token(7))
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    let res = client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/b"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["replaced"], "http://x/a");
}

#[tokio::test]
async fn grant_deliver_and_revoke_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let recipient = 1321743605496283174u64;

    client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": recipient.to_string(), "product_name": "Ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": recipient.to_string(), "product_name": "KeyA"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let granted: serde_json::Value = res.json().await.unwrap();
    let handle = granted["handle"].as_str().unwrap().to_string();

    // The recipient sees the delivery in their own inbox.
    let inbox: serde_json::Value = client
        .get(srv.url("/mailbox"))
        .bearer_auth(member_token(recipient))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(inbox["messages"][0]["message_id"], handle.as_str());
    assert!(inbox["messages"][0]["body"].as_str().unwrap().contains("http://x/a"));

    // Members can read their own grants but not other members'.
    let res = client
        .get(srv.url(&format!("/grants/{recipient}")))
        .bearer_auth(member_token(recipient))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["grants"][0]["product_name"], "KeyA");

    let res = client
        .get(srv.url(&format!("/grants/{recipient}")))
        .bearer_auth(member_token(7))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url(&format!("/grants/{recipient}/KeyA")))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["outcome"], "revoked");
    assert_eq!(body["notice_delivered"], true);

    let res = client
        .delete(srv.url(&format!("/grants/{recipient}/KeyA")))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "no_active_grant");
}

#[tokio::test]
async fn deleted_message_revokes_as_artifact_missing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let recipient = 4242u64;

    client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    let granted: serde_json::Value = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": recipient.to_string(), "product_name": "KeyA"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let handle = granted["handle"].as_str().unwrap();

    let res = client
        .delete(srv.url(&format!("/mailbox/{handle}")))
        .bearer_auth(member_token(recipient))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(srv.url(&format!("/grants/{recipient}/KeyA")))
        .bearer_auth(admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["outcome"], "artifact_missing");
}

#[tokio::test]
async fn recipient_closing_direct_messages_blocks_grants() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let recipient = 555u64;

    client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();

    let res = client
        .put(srv.url("/mailbox/settings"))
        .bearer_auth(member_token(recipient))
        .json(&json!({"accept_direct_messages": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": recipient.to_string(), "product_name": "KeyA"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "delivery_blocked");

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": "not-a-snowflake", "product_name": "KeyA"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_catalog_write_reports_persistence_error_but_keeps_product() {
    let srv = TestServer::spawn_with_catalog_at("state/product_links.json").await;
    let client = reqwest::Client::new();

    // A plain file where the catalog directory should be makes every write fail.
    std::fs::write(srv.data_dir().join("state"), b"").unwrap();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "persistence_error");
    assert!(body["message"].as_str().unwrap().contains("in memory"));

    let body: serde_json::Value = client.get(srv.url("/products")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["products"], json!(["KeyA"]));
}

#[tokio::test]
async fn product_names_are_exact_keys() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(admin_token())
        .json(&json!({"name": "KeyA ", "link": "http://x/a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": "77", "product_name": "KeyA "}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url("/grants"))
        .bearer_auth(admin_token())
        .json(&json!({"recipient_id": "77", "product_name": "KeyA"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
