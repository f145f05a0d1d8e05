use serde::Serialize;

/// One book scraped from the library page, keyed by title.
///
/// Optional fields stay absent in the rendered data when the page had no
/// matching element, so templates can test them with `is defined`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookEntry {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
}

impl BookEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Counts reported after an export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub books: usize,
    pub links: usize,
    pub images_copied: usize,
}
