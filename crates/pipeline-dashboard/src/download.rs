//! Client-side file downloads
//!
//! Exports (logs, run lists, metadata documents) are serialized from data the
//! page already holds and handed to the browser as a Blob; the backend is not
//! involved.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

pub const MIME_JSON: &str = "application/json";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("No document available")]
    NoDocument,
    #[error("Download failed: {0}")]
    Js(String),
}

impl From<JsValue> for DownloadError {
    fn from(err: JsValue) -> Self {
        DownloadError::Js(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    }
}

/// Offer `content` to the user as a file named `file_name`
pub fn trigger_download(file_name: &str, content: &str, mime: &str) -> Result<(), DownloadError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(DownloadError::NoDocument)?;

    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url)?;
    tracing::debug!(file = file_name, bytes = content.len(), "download triggered");
    Ok(())
}
