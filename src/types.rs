use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Named custom-recognition template registered with the OCR vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSignature {
    pub template_name: String,
    pub template_sign: String,
}

/// API key pair plus the user's custom templates. Always saved wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub templates: Vec<TemplateSignature>,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }

    pub fn template_by_name(&self, name: &str) -> Option<&TemplateSignature> {
        self.templates.iter().find(|t| t.template_name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Already-encoded image (e.g. a screen capture). Used verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl SourceFile {
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            image_data: None,
        }
    }

    pub fn from_image_data(name: impl Into<String>, image_data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            image_data: Some(image_data.into()),
        }
    }
}

/// One recognised document flattened to the five columns everything downstream uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    #[serde(default)]
    pub invoice_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    /// Original file name (set by the batch runner).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Error,
}

/// A selected file as the UI tracks it; mutated in place across attempts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    #[serde(flatten)]
    pub source: SourceFile,
    pub status: FileStatus,
    #[serde(flatten)]
    pub record: Option<NormalizedRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileItem {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn start(&mut self) {
        self.status = FileStatus::Processing;
        self.error = None;
    }

    pub fn succeed(&mut self, record: NormalizedRecord) {
        self.status = FileStatus::Success;
        self.record = Some(record);
        self.error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = FileStatus::Error;
        self.record = None;
        self.error = Some(error.into());
    }
}

/// File picked through the open-file collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFile {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenFileOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub filters: Vec<FileFilter>,
    #[serde(default)]
    pub multi_selection: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFileOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
    #[serde(default)]
    pub filters: Vec<FileFilter>,
}
