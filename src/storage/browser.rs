//! Browser download sink
//!
//! Triggers a file download in the browser: the artifact becomes a `Blob`,
//! a hidden anchor pointing at its object URL is clicked and removed again.
//! Used by WASM apps.

use super::{DownloadSink, SinkError};
use crate::writer::Artifact;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Browser download sink using an object URL and an anchor click
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownloadSink;

impl BrowserDownloadSink {
    /// Create a new browser download sink
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dsv_export::storage::browser::BrowserDownloadSink;
    ///
    /// let sink = BrowserDownloadSink::new();
    /// ```
    pub fn new() -> Self {
        Self
    }

    fn to_blob(artifact: &Artifact) -> Result<Blob, SinkError> {
        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(artifact.bytes()));

        let options = BlobPropertyBag::new();
        options.set_type(artifact.content_type());

        Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| SinkError::BackendError(format!("Failed to create Blob: {:?}", e)))
    }
}

impl DownloadSink for BrowserDownloadSink {
    fn save(&self, artifact: &Artifact, filename: &str) -> Result<(), SinkError> {
        let window = web_sys::window()
            .ok_or_else(|| SinkError::Unavailable("Window not available".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| SinkError::Unavailable("Document not available".to_string()))?;
        let body = document
            .body()
            .ok_or_else(|| SinkError::Unavailable("Document body not available".to_string()))?;

        let blob = Self::to_blob(artifact)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(|e| {
            SinkError::BackendError(format!("Failed to create object URL: {:?}", e))
        })?;

        let link = document
            .create_element("a")
            .map_err(|e| SinkError::BackendError(format!("Failed to create anchor: {:?}", e)))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| SinkError::BackendError("Element is not an anchor".to_string()))?;
        link.set_href(&url);
        link.set_download(filename);
        link.style()
            .set_property("display", "none")
            .map_err(|e| SinkError::BackendError(format!("Failed to hide anchor: {:?}", e)))?;

        body.append_child(&link)
            .map_err(|e| SinkError::BackendError(format!("Failed to attach anchor: {:?}", e)))?;
        link.click();
        body.remove_child(&link)
            .map_err(|e| SinkError::BackendError(format!("Failed to detach anchor: {:?}", e)))?;

        if let Err(e) = Url::revoke_object_url(&url) {
            web_sys::console::log_1(&format!("Failed to revoke object URL: {:?}", e).into());
        }

        Ok(())
    }
}
