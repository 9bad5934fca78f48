#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};
use uuid::Uuid;

use tasktrack::auth::{PasswordHasher, TokenKeys, TokenService};
use tasktrack::models::{Task, TaskInput, TaskPatch, User};
use tasktrack::routes;
use tasktrack::state::AppState;
use tasktrack::store::{MemoryStore, StoreError, TaskStore, UserStore};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

/// `MemoryStore` that counts every call made to it.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn remove_user(&self, id: i32) {
        self.inner.remove_user(id).await;
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        self.touch();
        UserStore::insert(&self.inner, email, password_hash).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.touch();
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        self.touch();
        self.inner.find_by_id(id).await
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn insert(&self, owner_id: i32, input: TaskInput) -> Result<Task, StoreError> {
        self.touch();
        TaskStore::insert(&self.inner, owner_id, input).await
    }

    async fn list_by_owner(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Task>, StoreError> {
        self.touch();
        self.inner.list_by_owner(owner_id, offset, limit).await
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        owner_id: i32,
    ) -> Result<Option<Task>, StoreError> {
        self.touch();
        self.inner.find_by_id_and_owner(id, owner_id).await
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: i32,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        self.touch();
        self.inner.update(id, owner_id, patch).await
    }

    async fn delete(&self, id: Uuid, owner_id: i32) -> Result<bool, StoreError> {
        self.touch();
        self.inner.delete(id, owner_id).await
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(TokenKeys::from_secret(TEST_SECRET), Duration::minutes(30))
}

pub fn test_state() -> (web::Data<AppState>, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let state = AppState::new(
        PasswordHasher::new(4),
        token_service(),
        store.clone(),
        store.clone(),
    )
    .expect("failed to build test state");
    (web::Data::new(state), store)
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub async fn send_json<S, B>(
    app: &S,
    req: test::TestRequest,
    payload: Option<Value>,
) -> (actix_web::http::StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = match payload {
        Some(payload) => req.set_json(payload),
        None => req,
    };
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            json!({ "raw": String::from_utf8_lossy(&body).to_string() })
        })
    };
    (status, json)
}

/// Registers `email`/`password` and logs in, returning the bearer token.
pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let credentials = json!({ "email": email, "password": password });

    let (status, body) = send_json(
        app,
        test::TestRequest::post().uri("/register"),
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, 201, "Registration failed. Body: {}", body);

    let (status, body) = send_json(
        app,
        test::TestRequest::post().uri("/login"),
        Some(credentials),
    )
    .await;
    assert_eq!(status, 200, "Login failed. Body: {}", body);

    body["access_token"]
        .as_str()
        .expect("login response should carry access_token")
        .to_string()
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
