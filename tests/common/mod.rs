//! Shared fixtures for integration tests.
//!
//! The router runs against the real services on top of an in-memory user
//! repository, so no PostgreSQL or Redis is needed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use accounts_api::api::{create_router, AppState};
use accounts_api::config::Config;
use accounts_api::domain::{CreateUser, User};
use accounts_api::errors::{AppError, AppResult};
use accounts_api::infra::{Database, UserRepository};
use accounts_api::services::Services;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// User repository backed by a map, enforcing unique emails like the
/// database index does.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn deactivate(&self, id: Uuid) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, input: CreateUser, password_hash: String) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == input.email) {
            return Err(AppError::conflict("User"));
        }
        let user = User::new(Uuid::new_v4(), input.email, password_hash, input.name);
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

pub fn test_config() -> Config {
    Config::new("postgres://localhost/accounts_test", TEST_SECRET).unwrap()
}

/// Application under test plus a handle on its user store.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
}

impl TestApp {
    /// Router whose database answers `ping_results` health checks.
    pub fn with_database_pings(ping_results: usize) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let services = Services::from_repository(users.clone(), test_config());

        let pings = (0..ping_results).map(|_| MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        });
        let connection = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(pings)
            .into_connection();
        let database = Arc::new(Database::from_connection(connection));

        let state = AppState::from_services(&services, database, None);
        Self {
            router: create_router(state),
            users,
        }
    }

    pub fn new() -> Self {
        Self::with_database_pings(0)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    /// Register and log in, returning the new user's id and token pair.
    pub async fn signup(&self, email: &str, password: &str) -> (Uuid, Value) {
        let (status, user) = self
            .post(
                "/auth/register",
                serde_json::json!({ "email": email, "password": password, "name": "Test User" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", user);

        let (status, tokens) = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", tokens);

        let id = user["id"].as_str().unwrap().parse().unwrap();
        (id, tokens)
    }
}
