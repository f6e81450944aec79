//! JSON description of a server-rendered page, used to seed a `MemoryPage`.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use shared::error::StorefrontError;

fn default_url() -> String {
    "http://localhost/".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_true")]
    pub intersection_observer: bool,
    #[serde(default = "default_true")]
    pub tooltip_widget: bool,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub files: Vec<FileFixture>,
    #[serde(default)]
    pub children: Vec<ElementFixture>,
}

/// A file selected in an `<input type="file">`. Give either `text` or
/// `contents_base64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFixture {
    pub name: String,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub contents_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self { name, mime, bytes }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl TryFrom<&FileFixture> for SelectedFile {
    type Error = StorefrontError;

    fn try_from(fixture: &FileFixture) -> Result<Self, Self::Error> {
        let bytes = match (&fixture.contents_base64, &fixture.text) {
            (Some(encoded), _) => STANDARD.decode(encoded.trim()).map_err(|err| {
                StorefrontError::Fixture(format!(
                    "file '{}' has invalid base64 contents: {err}",
                    fixture.name
                ))
            })?,
            (None, Some(text)) => text.as_bytes().to_vec(),
            (None, None) => Vec::new(),
        };
        let mut file = SelectedFile::new(fixture.name.clone(), bytes);
        if let Some(mime) = &fixture.mime {
            file.mime = mime.clone();
        }
        Ok(file)
    }
}
