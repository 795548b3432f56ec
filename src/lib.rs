//! Image format conversion over HTTP.
//!
//! `POST /process-image` takes a multipart form with an `image` file and a
//! `format` field and answers with the converted image as base64 text.

pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod server;
pub mod upload;
pub mod validate;

pub use codec::{CodecError, ImageCodec, RasterCodec};
pub use config::ServerConfig;
pub use convert::convert_to_base64;
pub use error::ConvertError;
pub use format::{TargetFormat, ALLOWED_FORMATS};
pub use server::{router, serve, AppState, PROCESS_IMAGE_PATH};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024; // 25 MiB

/// JSON body limit for routes other than the upload.
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS, PUT, PATCH, DELETE";
pub const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";
