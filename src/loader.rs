//! Turns a source file into the base64 payload the recognition endpoints expect.

use crate::error::{OcrError, Result};
use crate::types::SourceFile;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::path::Path;

/// Form field a payload is uploaded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Image,
    Pdf,
    Ofd,
}

impl UploadField {
    pub fn form_key(self) -> &'static str {
        match self {
            UploadField::Image => "image",
            UploadField::Pdf => "pdf_file",
            UploadField::Ofd => "ofd_file",
        }
    }
}

/// Extensions accepted by the open-file dialog, without the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "pdf", "ofd"];

/// Classify by extension (case-insensitive exact match).
pub fn classify_extension(name: &str) -> Result<UploadField> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    match extension.as_str() {
        ".pdf" => Ok(UploadField::Pdf),
        ".jpg" | ".jpeg" | ".png" | ".bmp" => Ok(UploadField::Image),
        ".ofd" => Ok(UploadField::Ofd),
        _ => Err(OcrError::UnsupportedFileType(extension)),
    }
}

/// Read a file and encode it as plain base64 (no data-URL header).
pub fn load_base64(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| OcrError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BASE64.encode(bytes))
}

/// Resolve the upload field and encoded content for `file`.
///
/// An explicit image payload wins over everything else and is passed through
/// untouched; otherwise the extension of `file.name` picks the field before
/// any disk access.
pub fn resolve_payload(
    file: &SourceFile,
    explicit_image_data: Option<&str>,
) -> Result<(UploadField, String)> {
    let image_data = explicit_image_data
        .or(file.image_data.as_deref())
        .filter(|d| !d.is_empty());
    if let Some(data) = image_data {
        return Ok((UploadField::Image, data.to_string()));
    }

    let field = classify_extension(&file.name)?;
    let path = file.path.as_deref().ok_or_else(|| OcrError::FileRead {
        path: file.name.clone().into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no path or image data"),
    })?;
    Ok((field, load_base64(path)?))
}
