//! Blob URL adapter: the whole resource copied into memory.

use std::sync::Arc;

use fos_dom::NodeId;
use fos_media::{Blob, SourceKind};

use super::{PlaybackAdapter, Strategy};
use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::{read_all, FileResource};
use crate::guard::check_length;
use crate::mime::mime_type_or_default;
use crate::options::RenderOptions;

/// Read the whole resource and register it under a fresh blob URL.
///
/// No length check happens here; media callers run the guard first.
pub(crate) fn materialize(
    file: &dyn FileResource,
    extension: &str,
    cx: &mut RenderContext<'_>,
) -> Result<(String, Arc<[u8]>), RenderErrorKind> {
    let data: Arc<[u8]> = read_all(file, None)?.into();
    let url = cx
        .blobs
        .create_object_url(Blob::new(data.clone(), mime_type_or_default(extension)));
    tracing::debug!(file = file.name(), url = %url, bytes = data.len(), "materialized");
    Ok((url, data))
}

pub(crate) struct BlobUrlAdapter {
    extension: String,
    options: RenderOptions,
    url: Option<String>,
}

impl BlobUrlAdapter {
    pub fn new(extension: &str, options: RenderOptions) -> Self {
        Self {
            extension: extension.to_string(),
            options,
            url: None,
        }
    }
}

impl PlaybackAdapter for BlobUrlAdapter {
    fn strategy(&self) -> Strategy {
        Strategy::BlobUrl
    }

    fn attach(
        &mut self,
        file: &dyn FileResource,
        node: NodeId,
        cx: &mut RenderContext<'_>,
    ) -> Result<(), RenderErrorKind> {
        check_length(file, &self.options)?;
        let (url, data) = materialize(file, &self.extension, cx)?;
        self.url = Some(url.clone());

        cx.attach_source(
            node,
            SourceKind::Blob {
                url,
                mime: mime_type_or_default(&self.extension).to_string(),
            },
        );
        cx.append(node, &data);
        cx.end_of_stream(node);
        Ok(())
    }

    fn pump(&mut self, _node: NodeId, _cx: &mut RenderContext<'_>) -> bool {
        false
    }

    fn release(&mut self, cx: &mut RenderContext<'_>) {
        if let Some(url) = self.url.take() {
            cx.blobs.revoke_object_url(&url);
        }
    }
}
