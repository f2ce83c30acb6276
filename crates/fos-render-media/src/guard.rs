//! Resource Limit Guard

use crate::error::RenderErrorKind;
use crate::file::FileResource;
use crate::options::RenderOptions;

/// Reject resources too large to copy into memory. A resource of unknown
/// length always passes.
pub fn check_length(file: &dyn FileResource, opts: &RenderOptions) -> Result<(), RenderErrorKind> {
    match file.length() {
        Some(length) if length > opts.max_resource_length => {
            tracing::debug!(file = file.name(), length, max = opts.max_resource_length, "resource too large");
            Err(RenderErrorKind::ResourceTooLarge {
                length,
                max: opts.max_resource_length,
            })
        }
        _ => Ok(()),
    }
}
