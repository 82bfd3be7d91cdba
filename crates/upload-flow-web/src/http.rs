//! fetch-based transport with a bounded timeout
//!
//! Every call is aborted through an `AbortController` once the
//! configured bound elapses. Responses are decoded by content type into
//! [`RawBody::Json`] or [`RawBody::Bytes`] for the interpreter.

use js_sys::Uint8Array;
use upload_flow::{FlowError, RawBody, RawResponse};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, FormData, Request, RequestInit, RequestMode, Response};

/// POST a multipart form. The browser sets the Content-Type so the
/// multipart boundary is correct.
pub async fn post_multipart(
    url: &str,
    form: &FormData,
    timeout_ms: u32,
) -> Result<RawResponse, FlowError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(form);
    send(url, opts, None, timeout_ms).await
}

/// POST a JSON body.
pub async fn post_json(
    url: &str,
    body: &serde_json::Value,
    timeout_ms: u32,
) -> Result<RawResponse, FlowError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    let body_str = serde_json::to_string(body).map_err(|e| FlowError::Transport(e.to_string()))?;
    opts.set_body(&JsValue::from_str(&body_str));
    send(url, opts, Some("application/json"), timeout_ms).await
}

async fn send(
    url: &str,
    opts: RequestInit,
    content_type: Option<&str>,
    timeout_ms: u32,
) -> Result<RawResponse, FlowError> {
    let window = web_sys::window().ok_or_else(|| FlowError::Transport("no window".to_string()))?;

    let abort = AbortController::new().map_err(js_err)?;
    opts.set_signal(Some(&abort.signal()));

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    if let Some(ct) = content_type {
        request.headers().set("Content-Type", ct).map_err(js_err)?;
    }

    // Abort once the bound elapses; cleared as soon as a response lands.
    // The closure stays owned on the Rust side so it is freed whether or
    // not the timer ever fires.
    let abort_for_timer = abort.clone();
    let on_timeout = Closure::once(Box::new(move || abort_for_timer.abort()) as Box<dyn FnOnce()>);
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.as_ref().unchecked_ref(),
            timeout_ms as i32,
        )
        .map_err(js_err)?;

    let fetched = JsFuture::from(window.fetch_with_request(&request)).await;
    window.clear_timeout_with_handle(timer);
    drop(on_timeout);

    let response = fetched.map_err(classify_fetch_error)?;
    let response: Response = response.dyn_into().map_err(js_err)?;

    decode(response).await
}

/// An aborted fetch rejects with a DOMException named `AbortError`;
/// everything else is a plain transport failure.
fn classify_fetch_error(err: JsValue) -> FlowError {
    let name = js_sys::Reflect::get(&err, &"name".into())
        .ok()
        .and_then(|v| v.as_string());
    if name.as_deref() == Some("AbortError") {
        FlowError::Timeout
    } else {
        FlowError::Transport(format!("{:?}", err))
    }
}

async fn decode(response: Response) -> Result<RawResponse, FlowError> {
    let status = response.status();
    let ok = response.ok();

    let content_type = response
        .headers()
        .get("Content-Type")
        .ok()
        .flatten()
        .unwrap_or_default();

    let body = if content_type.contains("application/json") {
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        let text = text.as_string().unwrap_or_default();
        let value = serde_json::from_str(&text)
            .map_err(|e| FlowError::Shape(format!("invalid JSON body: {}", e)))?;
        RawBody::Json(value)
    } else {
        let buffer = JsFuture::from(response.array_buffer().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        RawBody::Bytes(Uint8Array::new(&buffer).to_vec())
    };

    Ok(RawResponse { status, ok, body })
}

fn js_err(err: JsValue) -> FlowError {
    FlowError::Transport(format!("{:?}", err))
}
