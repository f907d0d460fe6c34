//! Read requests accepted by the document service

use crate::path::DocPath;

/// Options for reading one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetRequest {
    /// Subtree to read; root reads the whole document
    pub sub_path: DocPath,
    /// JSON filter; paths are relative to `sub_path`
    pub filter: Option<String>,
    /// JSON array of dotted field paths
    pub fields: Option<String>,
    pub page_size: Option<usize>,
    pub page_state: Option<String>,
}

impl GetRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(sub_path: DocPath) -> Self {
        Self {
            sub_path,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_page(mut self, page_size: usize, page_state: Option<String>) -> Self {
        self.page_size = Some(page_size);
        self.page_state = page_state;
        self
    }
}

/// Options for searching a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub filter: Option<String>,
    pub fields: Option<String>,
    pub page_size: Option<usize>,
    pub page_state: Option<String>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_page(mut self, page_size: usize, page_state: Option<String>) -> Self {
        self.page_size = Some(page_size);
        self.page_state = page_state;
        self
    }
}
