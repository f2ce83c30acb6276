//! Blob URLs
//!
//! `URL.createObjectURL` for bytes materialized in memory.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

/// Blob - immutable raw binary data
#[derive(Debug, Clone)]
pub struct Blob {
    data: Arc<[u8]>,
    mime_type: String,
}

impl Blob {
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: &str) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.to_string(),
        }
    }

    /// Get size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Registry of live blob URLs for one document
#[derive(Debug)]
pub struct BlobStore {
    origin: String,
    next_id: u64,
    blobs: HashMap<String, Blob>,
}

impl BlobStore {
    /// Store scoped to the origin of `document_url`. Opaque origins
    /// (`about:blank`, unparsable URLs) serialize as `null`.
    pub fn new(document_url: &str) -> Self {
        let origin = Url::parse(document_url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|_| "null".to_string());
        Self {
            origin,
            next_id: 0,
            blobs: HashMap::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Create a blob URL
    pub fn create_object_url(&mut self, blob: Blob) -> String {
        self.next_id += 1;
        let url = format!("blob:{}/{}", self.origin, self.next_id);
        self.blobs.insert(url.clone(), blob);
        url
    }

    /// Look up a live blob URL
    pub fn resolve(&self, url: &str) -> Option<&Blob> {
        self.blobs.get(url)
    }

    /// Revoke a blob URL
    pub fn revoke_object_url(&mut self, url: &str) -> bool {
        self.blobs.remove(url).is_some()
    }

    /// Number of live URLs
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
