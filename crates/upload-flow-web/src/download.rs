//! Blob download trigger
//!
//! Materializes in-memory bytes as an object URL, clicks a transient
//! anchor, and revokes the URL once the browser has begun the save.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, HtmlAnchorElement, Url};

/// Delay before the object URL is revoked and the anchor removed. Must
/// be nonzero so the browser can start the save before the reference
/// disappears.
const REVOKE_DELAY_MS: i32 = 100;

/// Trigger the browser's save flow for `bytes` under `filename`.
///
/// Each invocation owns its own URL/anchor pair, so repeated downloads
/// never revoke a reference a prior invocation is still using.
pub fn trigger_download(bytes: &[u8], filename: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let blob = Blob::new_with_u8_array_sequence(&parts)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    document.body().ok_or("No body")?.append_child(&anchor)?;
    anchor.click();

    let cleanup = Closure::once_into_js(move || {
        let _ = Url::revoke_object_url(&url);
        anchor.remove();
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cleanup.unchecked_ref(),
        REVOKE_DELAY_MS,
    )?;

    Ok(())
}
