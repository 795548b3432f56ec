use crate::error::ConvertError;
use crate::format::TargetFormat;
use crate::upload::UploadedFile;

/// Fails with `MissingFile` when no image was received.
pub fn require_file(image: Option<UploadedFile>) -> Result<UploadedFile, ConvertError> {
    image.ok_or(ConvertError::MissingFile)
}

/// Checks the `format` field against the allow-list.
pub fn require_format(format: Option<&str>) -> Result<TargetFormat, ConvertError> {
    format
        .and_then(TargetFormat::parse)
        .ok_or(ConvertError::UnsupportedFormat)
}
