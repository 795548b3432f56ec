//! Multipart upload parsing.
//!
//! The body is read fully into memory: one `image` file part and one
//! `format` text part. Nothing touches the disk.

use axum::body::Body;
use axum::http::{header, HeaderMap};
use bytes::Bytes;
use multer::{Constraints, Multipart, SizeLimit};

use crate::error::ConvertError;

pub const IMAGE_FIELD: &str = "image";
pub const FORMAT_FIELD: &str = "format";

/// Content type assumed for a file part that declares none.
const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Slack on top of the file limit for boundaries, part headers and text fields.
const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Result of parsing the form, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<UploadedFile>,
    pub format: Option<String>,
}

/// Accepts only declared `image/*` types.
pub fn check_mime(content_type: &str) -> Result<(), ConvertError> {
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ConvertError::FileFormat)
    }
}

/// Reads the multipart body.
///
/// A request that is not `multipart/form-data` yields an empty form, so the
/// file-presence check answers it. A rejected MIME type ends parsing
/// immediately.
pub async fn receive(
    headers: &HeaderMap,
    body: Body,
    max_file_bytes: u64,
) -> Result<UploadForm, ConvertError> {
    let boundary = match headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
    {
        Some(boundary) => boundary,
        None => {
            tracing::debug!("request is not multipart, no file received");
            return Ok(UploadForm::default());
        }
    };

    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .for_field(IMAGE_FIELD, max_file_bytes)
            .whole_stream(max_file_bytes.saturating_add(FORM_OVERHEAD_BYTES)),
    );
    let mut multipart =
        Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut form = UploadForm::default();
    let mut format_seen = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| limit_error(e, max_file_bytes))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            // a part without a filename is a plain text field, not an upload
            Some(IMAGE_FIELD) if form.image.is_none() && field.file_name().is_some() => {
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| DEFAULT_PART_CONTENT_TYPE.to_string());
                check_mime(&content_type)?;

                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| limit_error(e, max_file_bytes))?;

                tracing::debug!(
                    content_type = %content_type,
                    file_name = ?file_name,
                    size = bytes.len(),
                    "received upload"
                );

                if !bytes.is_empty() {
                    form.image = Some(UploadedFile {
                        bytes,
                        content_type,
                        file_name,
                    });
                }
            }
            Some(FORMAT_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| limit_error(e, max_file_bytes))?;
                format_seen += 1;
                form.format = (format_seen == 1).then_some(value);
            }
            // later `image` parts, text `image` parts and unknown fields are
            // drained by `next_field`
            _ => {}
        }
    }

    Ok(form)
}

fn limit_error(err: multer::Error, max_file_bytes: u64) -> ConvertError {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
            ConvertError::FileTooLarge {
                limit: max_file_bytes,
            }
        }
        other => ConvertError::Multipart(other),
    }
}
