#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use homematch::config::Config;
use homematch::db::Storage;
use homematch::router::{HomeMatchState, homematch_router};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const SERVICE_KEY: &str = "test-service-key";

static SEQ: AtomicU64 = AtomicU64::new(0);

/// A router over a throwaway SQLite file and storage directory.
pub struct TestApp {
    pub router: Router,
    pub config: Config,
    pub storage: Storage,
    db_path: PathBuf,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let tag = format!(
            "homematch-test-{}-{}-{}",
            std::process::id(),
            nanos,
            SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let tmp = std::env::temp_dir();
        let db_path = tmp.join(format!("{tag}.sqlite"));

        // Keep test behavior stable regardless of the repo's runtime `config.toml`.
        let mut config = Config {
            database_url: format!("sqlite:{}", db_path.display()),
            jwt_secret: JWT_SECRET.to_string(),
            service_key: SERVICE_KEY.to_string(),
            storage_dir: tmp.join(format!("{tag}-storage")),
            ..Config::default()
        };
        customize(&mut config);

        let storage = Storage::connect(&config.database_url)
            .await
            .expect("failed to open test database");
        let state = HomeMatchState::new(storage.clone(), Arc::new(config.clone()))
            .expect("failed to build state");
        Self {
            router: homematch_router(state),
            config,
            storage,
            db_path,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("request failed");
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }

    /// JSON request as an end user. `user` is the token subject.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", token_for(user)));
        }
        self.send(with_json(builder, body)).await
    }

    /// JSON request carrying the service key.
    pub async fn admin(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", SERVICE_KEY);
        self.send(with_json(builder, Some(body))).await
    }

    /// Insert listings through the admin route; returns their ids.
    pub async fn seed_properties(&self, listings: Vec<Value>) -> Vec<String> {
        let (status, body) = self
            .admin("PUT", "/api/admin/properties", json!({ "properties": listings }))
            .await;
        assert_eq!(status, StatusCode::OK, "seeding failed: {body}");
        body["ids"]
            .as_array()
            .expect("ids array")
            .iter()
            .map(|v| v.as_str().expect("id string").to_string())
            .collect()
    }

    /// Create a household owned by `owner` and join `members` to it.
    pub async fn household(&self, owner: &str, members: &[&str]) -> String {
        let (status, body) = self
            .call("POST", "/api/households", Some(owner), Some(json!({"name": "Home"})))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create household failed: {body}");
        let code = body["inviteCode"].as_str().expect("invite code").to_string();
        for member in members {
            let (status, body) = self
                .call(
                    "POST",
                    "/api/households/join",
                    Some(member),
                    Some(json!({ "inviteCode": code })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "join failed: {body}");
        }
        body["id"].as_str().expect("household id").to_string()
    }

    pub async fn interact(&self, user: &str, property_id: &str, kind: &str) -> Value {
        let (status, body) = self
            .call(
                "POST",
                "/api/interactions",
                Some(user),
                Some(json!({ "propertyId": property_id, "type": kind })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "interaction failed: {body}");
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.db_path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
        let _ = std::fs::remove_dir_all(&self.config.storage_dir);
    }
}

fn with_json(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request")
}

/// HS256 access token shaped like the identity provider's.
pub fn token_for(user: &str) -> String {
    token_with_secret(user, JWT_SECRET)
}

pub fn token_with_secret(user: &str, secret: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &json!({
            "sub": user,
            "email": format!("{user}@example.com"),
            "aud": "authenticated",
            "exp": exp,
        }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign token")
}

pub fn listing(id: &str, city: &str, price: i64, bedrooms: i64) -> Value {
    json!({
        "id": id,
        "address": format!("{id} Main St"),
        "city": city,
        "state": "TX",
        "zipCode": "78701",
        "price": price,
        "bedrooms": bedrooms,
        "bathrooms": 2.0,
        "propertyType": "house",
        "images": [format!("https://img.example.com/{id}.jpg")],
    })
}
