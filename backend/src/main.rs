use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use resource_storage::resource::ResourceStorage;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use backend::{
    image_storage::ImageStorage,
    server,
    state::AppState,
    types::{storage_credentials_available, Config, Environment},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // RUST_LOG wins over the per-environment default
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON logs for staging/production, human-readable for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env()?;
    let aws_config = environment.aws_config().await;

    let state = if storage_credentials_available(&aws_config).await {
        let region = aws_config.region().map(ToString::to_string);

        let s3_client = Arc::new(S3Client::from_conf(
            environment.s3_client_config(&aws_config),
        ));
        let image_storage = Arc::new(ImageStorage::new(
            s3_client,
            config.images_container.clone(),
            region.clone(),
            environment.public_bucket_url(&config.images_container, region.as_deref()),
        ));

        let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));
        let resource_storage = Arc::new(ResourceStorage::new(
            dynamodb_client,
            config.resources_table.clone(),
        ));

        tracing::info!(
            bucket = %config.images_container,
            table = %config.resources_table,
            "Storage configured"
        );

        AppState::new(config, image_storage, resource_storage)
    } else {
        tracing::warn!(
            "No storage credentials found, upload and resource endpoints will fail until they are configured"
        );
        AppState::without_storage(config)
    };

    server::start(environment, state).await
}
