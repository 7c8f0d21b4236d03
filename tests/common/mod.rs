#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jobseekers_api::auth::TokenService;
use jobseekers_api::config::AppConfig;
use jobseekers_api::database::store::{
    ApplyAck, DeleteAck, InsertAck, RecordFilter, UpdateAck,
};
use jobseekers_api::database::{
    Collection, Document, DocumentStore, MemoryDocumentStore, RecordId, StoreError,
};
use jobseekers_api::state::AppState;

pub const SECRET: &str = "integration-test-secret";

/// Memory store that counts every call made through the trait
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find(&self, collection: Collection, filter: RecordFilter) -> Result<Vec<Document>, StoreError> {
        self.hit();
        self.inner.find(collection, filter).await
    }

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Document>, StoreError> {
        self.hit();
        self.inner.find_by_id(collection, id).await
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertAck, StoreError> {
        self.hit();
        self.inner.insert_one(collection, doc).await
    }

    async fn delete_by_id(&self, collection: Collection, id: RecordId) -> Result<DeleteAck, StoreError> {
        self.hit();
        self.inner.delete_by_id(collection, id).await
    }

    async fn replace_by_id(
        &self,
        collection: Collection,
        id: RecordId,
        doc: Document,
    ) -> Result<UpdateAck, StoreError> {
        self.hit();
        self.inner.replace_by_id(collection, id, doc).await
    }

    async fn insert_and_increment(
        &self,
        collection: Collection,
        doc: Document,
        target_collection: Collection,
        target: RecordId,
        field: &str,
    ) -> Result<ApplyAck, StoreError> {
        self.hit();
        self.inner
            .insert_and_increment(collection, doc, target_collection, target, field)
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.hit();
        self.inner.ping().await
    }
}

pub struct TestApp {
    router: Router,
    pub store: Arc<CountingStore>,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(CountingStore::default());
        let tokens = TokenService::new(SECRET, chrono::Duration::hours(1)).expect("token service");
        let state = AppState::new(store.clone(), tokens.clone(), AppConfig::development());

        Self {
            router: jobseekers_api::app(state),
            store,
            tokens,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Send and decode the JSON response body
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let response = self.send(request(method, uri, cookie, body)).await?;
        let status = response.status();
        let body = parse_body(response).await?;
        Ok((status, body))
    }

    /// Log in with `identity` and return the `token=...` cookie pair
    pub async fn login(&self, identity: Value) -> Result<String> {
        let response = self
            .send(request(Method::POST, "/jwt", None, Some(identity)))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).context("login did not set the session cookie")
    }
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn parse_body(response: Response<Body>) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Raw `Set-Cookie` header for the session cookie, if present
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("token="))
        .map(str::to_string)
}

/// `token=<jwt>` pair suitable for a `Cookie` request header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response)
        .and_then(|raw| raw.split(';').next().map(str::to_string))
        .filter(|pair| pair.len() > "token=".len())
}
