use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::codec::{CodecError, ImageCodec};
use crate::error::{ConvertError, FILE_FORMAT_MESSAGE, PROCESSING_LOG_PREFIX};
use crate::format::TargetFormat;

/// Runs the codec on a blocking thread and returns the base64 text of the
/// converted image.
pub async fn convert_to_base64(
    codec: Arc<dyn ImageCodec>,
    bytes: Bytes,
    format: TargetFormat,
) -> Result<String, ConvertError> {
    let converted = tokio::task::spawn_blocking(move || codec.convert(&bytes, format)).await?;

    match converted {
        Ok(out) => {
            tracing::debug!(format = %format, size = out.len(), "image converted");
            Ok(STANDARD.encode(out))
        }
        Err(err) => Err(classify_codec_error(err)),
    }
}

/// Codec failures are 500s, except one whose text equals the upload MIME
/// rejection message.
// FIXME: this compares message text across two unrelated error sources and
// the codec is not known to ever produce it; kept for response parity.
fn classify_codec_error(err: CodecError) -> ConvertError {
    tracing::error!("{PROCESSING_LOG_PREFIX} {err:?}");

    if err.message() == FILE_FORMAT_MESSAGE {
        ConvertError::FileFormat
    } else {
        ConvertError::Codec(err)
    }
}
