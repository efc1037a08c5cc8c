mod config;
mod environment;
mod error;
mod extractors;

pub use config::Config;
pub use environment::{storage_credentials_available, Environment};
pub use error::{AppError, STORAGE_NOT_CONFIGURED};
pub use extractors::{
    UploadForm, ValidatedJson, INVALID_JSON, NAME_AND_URL_REQUIRED, NO_FILE_UPLOADED,
};
