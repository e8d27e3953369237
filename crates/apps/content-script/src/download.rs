//! Offering exported state as a file download

use anyhow::{Result, anyhow};
use folders::ExportFile;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url};

use crate::js_error;

/// Save `file` through a temporary object URL
pub fn offer(document: &Document, file: &ExportFile) -> Result<()> {
    let parts = Array::of1(&JsValue::from_str(&file.contents));
    let options = BlobPropertyBag::new();
    options.set_type(ExportFile::MIME_TYPE);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("Created element is not an anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(&file.filename);
    anchor.click();

    Url::revoke_object_url(&url).map_err(js_error)
}
