//! Application settings read once at startup

use std::env;
use std::str::FromStr;

use anyhow::Context;

/// Listen port when `PORT` is unset
pub const DEFAULT_PORT: u16 = 8080;
/// Upload limit when `MAX_FILE_SIZE_BYTES` is unset (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;
/// Bucket name when `IMAGES_CONTAINER` is unset
pub const DEFAULT_IMAGES_CONTAINER: &str = "affordable-resources";
/// Table name when `RESOURCES_TABLE` is unset
pub const DEFAULT_RESOURCES_TABLE: &str = "resources";

/// Room left for multipart boundaries and part headers on top of the file limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Settings shared by every request handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the HTTP server binds on all interfaces
    pub port: u16,
    /// Largest accepted upload, in bytes
    pub max_file_size_bytes: usize,
    /// Bucket holding uploaded images
    pub images_container: String,
    /// Table holding resource records
    pub resources_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            images_container: DEFAULT_IMAGES_CONTAINER.to_string(),
            resources_table: DEFAULT_RESOURCES_TABLE.to_string(),
        }
    }
}

impl Config {
    /// Reads the settings from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `MAX_FILE_SIZE_BYTES` is set but not a number
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: parse_var("PORT", DEFAULT_PORT)?,
            max_file_size_bytes: parse_var("MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE_BYTES)?,
            images_container: string_var("IMAGES_CONTAINER", DEFAULT_IMAGES_CONTAINER),
            resources_table: string_var("RESOURCES_TABLE", DEFAULT_RESOURCES_TABLE),
        })
    }

    /// Request body limit for the whole server
    #[must_use]
    pub const fn body_limit_bytes(&self) -> usize {
        self.max_file_size_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
