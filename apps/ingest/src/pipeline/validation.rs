use thiserror::Error;

use crate::extract::essence;
use crate::pipeline::models::UploadedFile;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no file provided")]
    MissingFile,

    #[error("empty file")]
    EmptyFile,

    #[error("file name is empty")]
    MissingFileName,

    #[error("file exceeds maximum size of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type: {0}")]
    DisallowedType(String),
}

/// Upload limits applied before anything touches storage.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Checks the upload and returns it with a normalized MIME type.
pub fn validate_upload(
    file: Option<&UploadedFile>,
    limits: &UploadLimits,
) -> Result<UploadedFile, ValidationError> {
    let file = file.ok_or(ValidationError::MissingFile)?;

    if file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile);
    }
    if file.name.trim().is_empty() {
        return Err(ValidationError::MissingFileName);
    }
    if file.size() > limits.max_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            max: limits.max_bytes,
        });
    }

    let mime_type = effective_mime_type(&file.name, &file.mime_type);
    if !limits
        .allowed_mime_types
        .iter()
        .any(|allowed| essence(allowed) == mime_type)
    {
        return Err(ValidationError::DisallowedType(mime_type));
    }

    Ok(UploadedFile {
        name: file.name.trim().to_string(),
        mime_type,
        bytes: file.bytes.clone(),
    })
}

/// Browsers often send `application/octet-stream` (or nothing) for Word files.
/// In that case fall back to the file extension.
pub fn effective_mime_type(file_name: &str, declared: &str) -> String {
    let declared = essence(declared);
    if !declared.is_empty() && declared != "application/octet-stream" {
        return declared;
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ if declared.is_empty() => "application/octet-stream",
        _ => return declared,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, mime: &str, body: &'static [u8]) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            bytes: Bytes::from_static(body),
        }
    }

    #[test]
    fn test_missing_file() {
        assert_eq!(
            validate_upload(None, &UploadLimits::default()),
            Err(ValidationError::MissingFile)
        );
    }

    #[test]
    fn test_empty_file_message() {
        let err = validate_upload(Some(&file("cv.pdf", "application/pdf", b"")), &UploadLimits::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "empty file");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(
            validate_upload(Some(&file("  ", "application/pdf", b"%PDF")), &UploadLimits::default()),
            Err(ValidationError::MissingFileName)
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let limits = UploadLimits {
            max_bytes: 4,
            ..UploadLimits::default()
        };
        assert!(validate_upload(Some(&file("a.txt", "text/plain", b"abcd")), &limits).is_ok());
        assert_eq!(
            validate_upload(Some(&file("a.txt", "text/plain", b"abcde")), &limits),
            Err(ValidationError::TooLarge { size: 5, max: 4 })
        );
    }

    #[test]
    fn test_disallowed_type() {
        let err = validate_upload(Some(&file("a.png", "image/png", b"\x89PNG")), &UploadLimits::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported file type: image/png");
    }

    #[test]
    fn test_mime_parameters_and_case_are_normalized() {
        let ok = validate_upload(
            Some(&file("a.txt", "Text/Plain; charset=utf-8", b"hi")),
            &UploadLimits::default(),
        )
        .unwrap();
        assert_eq!(ok.mime_type, "text/plain");
    }

    #[test]
    fn test_octet_stream_inferred_from_extension() {
        assert_eq!(
            effective_mime_type("Resume.DOCX", "application/octet-stream"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(effective_mime_type("cv.pdf", ""), "application/pdf");
        assert_eq!(effective_mime_type("cv", ""), "application/octet-stream");
        assert_eq!(
            effective_mime_type("cv.bin", "application/octet-stream"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_declared_type_wins_over_extension() {
        assert_eq!(effective_mime_type("cv.pdf", "text/plain"), "text/plain");
    }
}
