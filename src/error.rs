use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::codec::CodecError;

pub const MISSING_FILE_MESSAGE: &str = "Brak przesłanego pliku";
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Nieobsługiwany format obrazu";
pub const FILE_FORMAT_MESSAGE: &str = "Niewłaściwy format pliku";
pub const FILE_TOO_LARGE_MESSAGE: &str = "Plik jest zbyt duży";
pub const INTERNAL_ERROR_MESSAGE: &str = "Wewnętrzny błąd serwera";

/// Prefix for every server-side failure logged by the conversion path.
pub const PROCESSING_LOG_PREFIX: &str = "Błąd przetwarzania obrazu na serwerze:";

#[derive(Debug, Error)]
pub enum ConvertError {
    /// No usable `image` part in the request
    #[error("Brak przesłanego pliku")]
    MissingFile,

    /// `format` is absent or not in the allow-list
    #[error("Nieobsługiwany format obrazu")]
    UnsupportedFormat,

    /// Declared MIME type of the upload is not `image/*`
    #[error("Niewłaściwy format pliku")]
    FileFormat,

    #[error("upload exceeds {limit} bytes")]
    FileTooLarge { limit: u64 },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConvertError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConvertError::MissingFile
            | ConvertError::UnsupportedFormat
            | ConvertError::FileFormat => StatusCode::BAD_REQUEST,
            ConvertError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ConvertError::Codec(_) | ConvertError::Multipart(_) | ConvertError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed client-facing text; internal details never reach the body.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConvertError::MissingFile => MISSING_FILE_MESSAGE,
            ConvertError::UnsupportedFormat => UNSUPPORTED_FORMAT_MESSAGE,
            ConvertError::FileFormat => FILE_FORMAT_MESSAGE,
            ConvertError::FileTooLarge { .. } => FILE_TOO_LARGE_MESSAGE,
            ConvertError::Codec(_) | ConvertError::Multipart(_) | ConvertError::Task(_) => {
                INTERNAL_ERROR_MESSAGE
            }
        }
    }
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // codec failures are logged where they are classified
        if status.is_server_error() && !matches!(self, ConvertError::Codec(_)) {
            tracing::error!("{PROCESSING_LOG_PREFIX} {self:?}");
        } else if status.is_client_error() {
            tracing::debug!(status = %status, "Client error: {}", self);
        }

        (status, self.user_message()).into_response()
    }
}
