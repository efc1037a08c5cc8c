use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    image_storage::InMemoryImageStore,
    server,
    state::AppState,
    types::{Config, Environment},
};
use resource_storage::resource::InMemoryResourceTable;
use tower::ServiceExt;

use super::multipart::multipart_content_type;

/// Public URL prefix of the in-memory bucket
pub const TEST_BUCKET_URL: &str = "http://localhost:4566/affordable-resources";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

fn development() -> Environment {
    Environment::Development {
        localstack_url: "http://localhost:4566".to_string(),
    }
}

/// Router wired to in-memory stores
pub struct TestSetup {
    pub router: Router,
    pub images: Arc<InMemoryImageStore>,
    pub resources: Arc<InMemoryResourceTable>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(
            development(),
            config,
            InMemoryImageStore::new(TEST_BUCKET_URL),
            InMemoryResourceTable::new(),
        )
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self::build(
            environment,
            Config::default(),
            InMemoryImageStore::new(TEST_BUCKET_URL),
            InMemoryResourceTable::new(),
        )
    }

    /// Stores that fail every call, as if the storage service were down
    pub fn unavailable() -> Self {
        Self::build(
            development(),
            Config::default(),
            InMemoryImageStore::unavailable(TEST_BUCKET_URL),
            InMemoryResourceTable::unavailable(),
        )
    }

    /// Router for a process started without storage credentials
    ///
    /// The returned stores are not reachable from the router.
    pub fn without_storage() -> Self {
        setup_test_env();

        let router = server::router(development(), AppState::without_storage(Config::default()));

        Self {
            router,
            images: Arc::new(InMemoryImageStore::new(TEST_BUCKET_URL)),
            resources: Arc::new(InMemoryResourceTable::new()),
        }
    }

    fn build(
        environment: Environment,
        config: Config,
        images: InMemoryImageStore,
        resources: InMemoryResourceTable,
    ) -> Self {
        setup_test_env();

        let images = Arc::new(images);
        let resources = Arc::new(resources);
        let state = AppState::new(config, images.clone(), resources.clone());

        Self {
            router: server::router(environment, state),
            images,
            resources,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, "application/json", payload.to_string())
            .await
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", content_type)
            .body(body.into())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Posts a multipart body, optionally declaring its `Content-Length`
    pub async fn send_multipart_request(
        &self,
        route: &str,
        body: Vec<u8>,
        content_length: Option<u64>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", multipart_content_type());

        if let Some(length) = content_length {
            builder = builder.header("Content-Length", length.to_string());
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body))?)
            .await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    serde_json::from_slice(&body).expect("Response body is not JSON")
}

pub async fn response_text(response: Response) -> String {
    use http_body_util::BodyExt;

    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    String::from_utf8(body.to_vec()).expect("Response body is not UTF-8")
}
