use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Stable identity of a document row within one form session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub residential_street1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential_street2: Option<String>,
    #[serde(default)]
    pub same_as_residential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_street1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_street2: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Submission {
    /// Fresh submission as shown on form load: two blank documents, date of birth set to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            date_of_birth: today,
            residential_street1: String::new(),
            residential_street2: None,
            same_as_residential: false,
            permanent_street1: None,
            permanent_street2: None,
            documents: vec![Document::blank(), Document::blank()],
        }
    }

    /// Non-file fields, sent as the `data` part of the upload request
    pub fn personal_details(&self) -> PersonalDetails<'_> {
        PersonalDetails {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            date_of_birth: self.date_of_birth,
            residential_street1: &self.residential_street1,
            residential_street2: self.residential_street2.as_deref(),
            same_as_residential: self.same_as_residential,
            permanent_street1: self.permanent_street1.as_deref(),
            permanent_street2: self.permanent_street2.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub date_of_birth: NaiveDate,
    pub residential_street1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential_street2: Option<&'a str>,
    pub same_as_residential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent_street1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent_street2: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_name: String,
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
}

impl Document {
    pub fn blank() -> Self {
        Self {
            file_name: String::new(),
            file_type: FileType::Image,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    Image,
    Pdf,
    // Kept verbatim so validation can report it
    Other(String),
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Image => "image",
            FileType::Pdf => "pdf",
            FileType::Other(s) => s,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileType::Other(_))
    }

    /// Human-readable label for the type selector
    pub fn label(&self) -> &str {
        match self {
            FileType::Image => "Image",
            FileType::Pdf => "PDF",
            FileType::Other(s) => s,
        }
    }

    /// Content types the file picker accepts for this document type
    pub fn accept(&self) -> &str {
        match self {
            FileType::Image => "image/*",
            FileType::Pdf => "application/pdf",
            FileType::Other(_) => "*/*",
        }
    }

    pub fn options() -> Vec<FileType> {
        vec![FileType::Image, FileType::Pdf]
    }
}

impl From<String> for FileType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image" => FileType::Image,
            "pdf" => FileType::Pdf,
            _ => FileType::Other(value),
        }
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        value.as_str().to_string()
    }
}

/// Locally attached file. Only metadata is serialized; bytes are read at upload time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub path: PathBuf,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl FileRef {
    /// Build a reference from a path on disk, reading its size
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            content_type: content_type_for(path).to_string(),
            name,
            size: metadata.len(),
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf"
    }

    /// Whether this file matches what the picker accepts for `file_type`
    pub fn matches(&self, file_type: &FileType) -> bool {
        match file_type {
            FileType::Image => self.is_image(),
            FileType::Pdf => self.is_pdf(),
            FileType::Other(_) => true,
        }
    }
}

/// Content type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
