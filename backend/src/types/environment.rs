//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use tracing::Level;

/// `LocalStack` endpoint used in development unless `LOCALSTACK_URL` is set
const DEFAULT_LOCALSTACK_URL: &str = "http://localhost:4566";

/// Region assumed when the SDK config carries none
const DEFAULT_REGION: &str = "us-east-1";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Base URL of the `LocalStack` gateway
        localstack_url: String,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                localstack_url: env::var("LOCALSTACK_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCALSTACK_URL.to_string()),
            },
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            Self::Development { localstack_url } => Some(localstack_url.trim_end_matches('/')),
        }
    }

    /// AWS configuration with timeout settings
    ///
    /// SDK retries are disabled: every storage call is attempted once and its
    /// outcome goes straight back to the caller.
    pub async fn aws_config(&self) -> SdkConfig {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    #[must_use]
    pub fn s3_client_config(&self, aws_config: &SdkConfig) -> aws_sdk_s3::Config {
        let s3_config: aws_sdk_s3::Config = aws_config.into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Public base URL of `bucket`, without a trailing slash
    #[must_use]
    pub fn public_bucket_url(&self, bucket: &str, region: Option<&str>) -> String {
        match self.override_aws_endpoint_url() {
            Some(endpoint_url) => format!("{endpoint_url}/{bucket}"),
            None => {
                let region = region.unwrap_or(DEFAULT_REGION);
                format!("https://{bucket}.s3.{region}.amazonaws.com")
            }
        }
    }

    /// Fallback log level, `TRACING_LEVEL` when it parses
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

/// Whether the SDK's credential chain can produce credentials
///
/// Missing credentials are not fatal at startup; storage endpoints report
/// them per request instead.
pub async fn storage_credentials_available(aws_config: &SdkConfig) -> bool {
    let Some(provider) = aws_config.credentials_provider() else {
        return false;
    };

    match provider.provide_credentials().await {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!("No storage credentials: {err}");
            false
        }
    }
}
