//! Integration tests for the PKM backend.

use std::sync::Arc;

use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

// Quiet logs during tests; RUST_LOG still overrides.
static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
});

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Lazy::force(&TRACING);

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            session_ttl_hours: 1,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign up a user and log in, returning (user id, session token).
    async fn signup_and_login(&self, email: &str, username: &str) -> (i64, String) {
        let resp = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({
                "email": email,
                "username": username,
                "password": "secret123"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let user_id = body["data"]["id"].as_i64().unwrap();

        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": "secret123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();

        (user_id, token)
    }

    /// Create a tag and return its JSON.
    async fn create_tag(&self, token: &str, owner_id: i64, name: &str, color: Option<&str>) -> Value {
        let mut body = json!({ "ownerId": owner_id, "name": name });
        if let Some(color) = color {
            body["color"] = json!(color);
        }
        let resp = self
            .client
            .post(self.url("/api/tags"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    /// Create an item from a request body and return its JSON.
    async fn create_item(&self, token: &str, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/items"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    /// Collect the tag names attached to an item JSON value.
    fn tag_names(item: &Value) -> Vec<String> {
        let mut names: Vec<String> = item["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_signup_and_login_flow() {
    let fixture = TestFixture::new().await;

    // Sign up
    let resp = fixture
        .client
        .post(fixture.url("/api/users"))
        .json(&json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "hunter2hunter2",
            "firstName": "Alice"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["is_active"], true);
    // The hash must never appear in a response
    assert!(body["data"].get("password_hash").is_none());

    // Duplicate email is a conflict
    let resp = fixture
        .client
        .post(fixture.url("/api/users"))
        .json(&json!({
            "email": "alice@example.com",
            "username": "alice2",
            "password": "hunter2hunter2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Login
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["token"].as_str().unwrap().len() > 10);
    assert_eq!(body["data"]["user"]["username"], "alice");

    // Wrong password
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid email or password");

    // Unknown email gets the same message
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "whatever" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_requests_require_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/items/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = fixture
        .client
        .get(fixture.url("/api/items/1"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_owner_mismatch_is_forbidden() {
    let fixture = TestFixture::new().await;
    let (_alice, alice_token) = fixture.signup_and_login("a@example.com", "alice").await;
    let (bob, _bob_token) = fixture.signup_and_login("b@example.com", "bob").await;

    // Alice cannot list Bob's items
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", bob)))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Nor create items in his name
    let resp = fixture
        .client
        .post(fixture.url("/api/items"))
        .bearer_auth(&alice_token)
        .json(&json!({ "ownerId": bob, "content": "sneaky" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_item_crud_defaults() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    // Create with content only: everything else defaults
    let item = fixture
        .create_item(&token, json!({ "ownerId": user, "content": "buy milk" }))
        .await;
    assert_eq!(item["item_type"], "task");
    assert_eq!(item["completed"], false);
    assert_eq!(item["pinned"], false);
    assert_eq!(item["archived"], false);
    assert!(item["priority"].is_null());
    assert!(item["due_date"].is_null());
    assert_eq!(item["tags"].as_array().unwrap().len(), 0);
    let id = item["id"].as_i64().unwrap();

    // Update content
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "content": "buy oat milk", "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["content"], "buy oat milk");
    assert_eq!(body["data"]["completed"], true);

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Item deleted successfully");

    // Deleting again is a uniform 404
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_item_created_with_tags_lists_exact_tag_set() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let urgent = fixture
        .create_tag(&token, user, "urgent", Some("#ff0000"))
        .await;
    let home = fixture.create_tag(&token, user, "home", None).await;
    let urgent_id = urgent["id"].as_i64().unwrap();
    let home_id = home["id"].as_i64().unwrap();

    // Duplicate id in the request is a no-op, not an error
    let item = fixture
        .create_item(
            &token,
            json!({
                "ownerId": user,
                "content": "ship release",
                "item_type": "task",
                "tags": [urgent_id, home_id, urgent_id]
            }),
        )
        .await;
    assert_eq!(item["completed"], false);
    assert_eq!(TestFixture::tag_names(&item), vec!["home", "urgent"]);

    let urgent_tag = item["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "urgent")
        .unwrap();
    assert_eq!(urgent_tag["color"], "#ff0000");

    // Default color applies when none was supplied
    let home_tag = item["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "home")
        .unwrap();
    assert_eq!(home_tag["color"], "#6366f1");

    // List returns the same set
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let listed = &body["data"].as_array().unwrap()[0];
    assert_eq!(TestFixture::tag_names(listed), vec!["home", "urgent"]);
}

#[tokio::test]
async fn test_update_tags_replaces_and_clears() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let t1 = fixture.create_tag(&token, user, "one", None).await;
    let t2 = fixture.create_tag(&token, user, "two", None).await;
    let t1_id = t1["id"].as_i64().unwrap();
    let t2_id = t2["id"].as_i64().unwrap();

    let item = fixture
        .create_item(
            &token,
            json!({ "ownerId": user, "content": "retag me", "tags": [t1_id] }),
        )
        .await;
    let id = item["id"].as_i64().unwrap();

    // Supplying tags fully replaces the set
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "tags": [t2_id] }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(TestFixture::tag_names(&body["data"]), vec!["two"]);

    // An empty list clears all associations
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "tags": [] }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_archived_items_leave_default_listing() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let item = fixture
        .create_item(&token, json!({ "ownerId": user, "content": "old notes" }))
        .await;
    let id = item["id"].as_i64().unwrap();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "archived": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Gone from the default listing
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Still reachable through search with archived=true
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/search/{}?archived=true", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"].as_i64().unwrap(), id);
}

#[tokio::test]
async fn test_partial_update_null_priority() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let item = fixture
        .create_item(
            &token,
            json!({
                "ownerId": user,
                "content": "tune cache",
                "priority": "high",
                "due_date": "2026-09-01"
            }),
        )
        .await;
    let id = item["id"].as_i64().unwrap();
    assert_eq!(item["priority"], "high");

    // Explicit null clears priority without touching anything else
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "priority": null }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["priority"].is_null());
    assert_eq!(body["data"]["content"], "tune cache");
    assert_eq!(body["data"]["completed"], false);
    assert_eq!(body["data"]["due_date"], "2026-09-01");

    // Empty update body is a legal no-op returning current state
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/items/{}", id)))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["content"], "tune cache");
    assert!(body["data"]["priority"].is_null());
}

#[tokio::test]
async fn test_tag_conflicts_and_rename() {
    let fixture = TestFixture::new().await;
    let (alice, alice_token) = fixture.signup_and_login("a@example.com", "alice").await;
    let (bob, bob_token) = fixture.signup_and_login("b@example.com", "bob").await;

    fixture.create_tag(&alice_token, alice, "work", None).await;

    // Same name, same owner: conflict
    let resp = fixture
        .client
        .post(fixture.url("/api/tags"))
        .bearer_auth(&alice_token)
        .json(&json!({ "ownerId": alice, "name": "work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Same name, different owner: fine
    let resp = fixture
        .client
        .post(fixture.url("/api/tags"))
        .bearer_auth(&bob_token)
        .json(&json!({ "ownerId": bob, "name": "work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Renaming onto an existing name is also a conflict
    let other = fixture.create_tag(&alice_token, alice, "play", None).await;
    let other_id = other["id"].as_i64().unwrap();
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/tags/{}", other_id)))
        .bearer_auth(&alice_token)
        .json(&json!({ "name": "work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Recolor leaves the name alone
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/tags/{}", other_id)))
        .bearer_auth(&alice_token)
        .json(&json!({ "color": "#00ff00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "play");
    assert_eq!(body["data"]["color"], "#00ff00");

    // Listing is alphabetical
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/tags/{}", alice)))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["play", "work"]);
}

#[tokio::test]
async fn test_deleting_tag_detaches_it_from_items() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let tag = fixture.create_tag(&token, user, "ephemeral", None).await;
    let tag_id = tag["id"].as_i64().unwrap();

    let item = fixture
        .create_item(
            &token,
            json!({ "ownerId": user, "content": "tagged", "tags": [tag_id] }),
        )
        .await;
    assert_eq!(TestFixture::tag_names(&item), vec!["ephemeral"]);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/tags/{}", tag_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Tag is gone from the vocabulary and from the item
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/tags/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_composes_filters() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let tag = fixture.create_tag(&token, user, "q3", None).await;
    let tag_id = tag["id"].as_i64().unwrap();

    fixture
        .create_item(
            &token,
            json!({ "ownerId": user, "content": "Quarterly PLAN draft", "item_type": "note" }),
        )
        .await;
    fixture
        .create_item(
            &token,
            json!({
                "ownerId": user,
                "content": "planning meeting follow-up",
                "item_type": "note",
                "pinned": true,
                "tags": [tag_id]
            }),
        )
        .await;
    fixture
        .create_item(
            &token,
            json!({ "ownerId": user, "content": "plan the release", "item_type": "task" }),
        )
        .await;

    // Case-insensitive substring, scoped to notes, pinned first
    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/items/search/{}?item_type=note&search=plan",
            user
        )))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0]["pinned"], true);
    assert_eq!(found[0]["content"], "planning meeting follow-up");
    assert_eq!(found[1]["content"], "Quarterly PLAN draft");

    // Tag filter narrows further
    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/items/search/{}?search=plan&tags={}",
            user, tag_id
        )))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["content"], "planning meeting follow-up");
    assert_eq!(TestFixture::tag_names(&found[0]), vec!["q3"]);

    // completed=false matches all three; "all" is a no-op filter
    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/items/search/{}?completed=false&item_type=all",
            user
        )))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_todo_crud() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/todos"))
        .bearer_auth(&token)
        .json(&json!({ "ownerId": user, "text": "water plants" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["text"], "water plants");
    assert_eq!(body["data"]["type"], "personal");
    assert_eq!(body["data"]["completed"], false);
    let id = body["data"]["id"].as_i64().unwrap();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/todos/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "completed": true, "type": "chores" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["type"], "chores");
    assert_eq!(body["data"]["text"], "water plants");

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/todos/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/todos/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/todos/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_product_crud_and_filters() {
    let fixture = TestFixture::new().await;
    let (_user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Espresso Grinder",
            "price": 249.0,
            "category": "kitchen",
            "description": "burr grinder"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let grinder_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["stock"], 0);
    assert_eq!(body["data"]["is_active"], true);

    fixture
        .client
        .post(fixture.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Desk Lamp", "price": 39.5, "is_active": false }))
        .send()
        .await
        .unwrap();

    // Category filter
    let resp = fixture
        .client
        .get(fixture.url("/api/products?category=kitchen"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Substring filter matches name or description
    let resp = fixture
        .client
        .get(fixture.url("/api/products?search=burr"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["name"], "Espresso Grinder");

    // Active filter
    let resp = fixture
        .client
        .get(fixture.url("/api/products?is_active=false"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Desk Lamp");

    // Update and explicit-null description
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/products/{}", grinder_id)))
        .bearer_auth(&token)
        .json(&json!({ "stock": 12, "description": null }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["stock"], 12);
    assert!(body["data"]["description"].is_null());

    // Missing product is 404
    let resp = fixture
        .client
        .get(fixture.url("/api/products/99999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/products/{}", grinder_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/products/{}", grinder_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    // Item without content
    let resp = fixture
        .client
        .post(fixture.url("/api/items"))
        .bearer_auth(&token)
        .json(&json!({ "ownerId": user }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "ownerId and content are required");

    // Tag without a name
    let resp = fixture
        .client
        .post(fixture.url("/api/tags"))
        .bearer_auth(&token)
        .json(&json!({ "ownerId": user, "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Product without a price
    let resp = fixture
        .client
        .post(fixture.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Free Lunch" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Signup without a password
    let resp = fixture
        .client
        .post(fixture.url("/api/users"))
        .json(&json!({ "email": "x@example.com", "username": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Search with an unknown item type
    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/items/search/{}?item_type=reminder",
            user
        )))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_deleting_user_cascades_sessions() {
    let fixture = TestFixture::new().await;
    let (user, token) = fixture.signup_and_login("u@example.com", "user1").await;

    // Seed some owned data to exercise the cascade
    let tag = fixture.create_tag(&token, user, "mine", None).await;
    fixture
        .create_item(
            &token,
            json!({ "ownerId": user, "content": "mine", "tags": [tag["id"]] }),
        )
        .await;

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/users/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The session died with the user
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/items/{}", user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // A user cannot delete someone else's account
    let (_other, other_token) = fixture.signup_and_login("o@example.com", "other").await;
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/users/{}", user)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
