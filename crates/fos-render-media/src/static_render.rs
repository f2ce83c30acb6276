//! Image and document rendering
//!
//! Single shot: materialize, point the element at the blob URL, done.
//! There is no fallback, so any failure is final. Neither path runs the
//! length guard.

use fos_dom::NodeId;

use crate::adapters::materialize;
use crate::classify::OBJECT_DOCUMENT_EXT;
use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::FileResource;

/// Sandbox applied to documents shown in an `<iframe>`
pub const IFRAME_SANDBOX: &str = "allow-forms allow-scripts";

/// `<img src=blob alt=name>`
pub(crate) fn render_image(
    file: &dyn FileResource,
    extension: &str,
    node: NodeId,
    cx: &mut RenderContext<'_>,
) -> Result<(), RenderErrorKind> {
    let (url, _) = materialize(file, extension, cx)?;
    let applied = cx
        .document
        .set_attribute(node, "src", url.as_str())
        .and_then(|()| cx.document.set_attribute(node, "alt", file.name()));
    settle(url, applied, cx)
}

/// `<iframe sandbox src=blob>`, or `<object type typemustmatch data=blob>`
/// for PDFs
pub(crate) fn render_document(
    file: &dyn FileResource,
    extension: &str,
    node: NodeId,
    cx: &mut RenderContext<'_>,
) -> Result<(), RenderErrorKind> {
    let (url, _) = materialize(file, extension, cx)?;
    let document = &mut *cx.document;
    let applied = if extension == OBJECT_DOCUMENT_EXT {
        document
            .set_attribute(node, "type", "application/pdf")
            .and_then(|()| document.set_flag(node, "typemustmatch", true))
            .and_then(|()| document.set_attribute(node, "data", url.as_str()))
    } else {
        document
            .set_attribute(node, "sandbox", IFRAME_SANDBOX)
            .and_then(|()| document.set_attribute(node, "src", url.as_str()))
    };
    settle(url, applied, cx)
}

fn settle(
    url: String,
    applied: fos_dom::DomResult<()>,
    cx: &mut RenderContext<'_>,
) -> Result<(), RenderErrorKind> {
    if let Err(e) = applied {
        cx.blobs.revoke_object_url(&url);
        return Err(e.into());
    }
    Ok(())
}
