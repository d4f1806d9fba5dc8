use ammonia::Builder;

use crate::markup::{ANNOTATION_CLASS, CONNECTOR_CLASS, DIR_CLASS, FILE_CLASS};

pub fn sanitize_html(html: &str) -> String {
    // ammonia's defaults strip scripts, event handlers and unsafe URLs
    Builder::new().clean(html).to_string()
}

/// Sanitize while keeping the classes emitted for `dirtree` blocks, so the
/// stylesheet still applies after cleaning.
pub fn sanitize_dirtree_html(html: &str) -> String {
    Builder::new()
        .add_allowed_classes("div", &["el-pre"])
        .add_allowed_classes("pre", &["language-dirtree"])
        .add_allowed_classes("code", &["language-dirtree", "is-loaded"])
        .add_allowed_classes(
            "span",
            &[CONNECTOR_CLASS, DIR_CLASS, FILE_CLASS, ANNOTATION_CLASS],
        )
        .clean(html)
        .to_string()
}
