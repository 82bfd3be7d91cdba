//! Document processing app
//!
//! Drop a PDF, describe what the service should do with it (title plus
//! instructions), submit, and download the processed document. The
//! response is an opaque binary artifact; the only rendering is the
//! download affordance.

use std::cell::RefCell;
use std::rc::Rc;

use upload_flow::{
    interpret, ArtifactNaming, Expectation, FlowError, InputCollector, Outcome, Phase,
    ServiceConfig, TaskController, TaskState,
};
use upload_flow_web::{post_multipart, trigger_download};
use wasm_bindgen::prelude::*;
use web_sys::{File, FormData};

const PROCESS_ENDPOINT: &str = "process";
const FILE_FIELD: &str = "document";
const TITLE_FIELD: &str = "title";
const INSTRUCTIONS_FIELD: &str = "instructions";
const OUTPUT_NAME: &str = "processed_document.pdf";

struct Inner {
    config: ServiceConfig,
    collector: InputCollector,
    process: TaskController,
    naming: ArtifactNaming,
}

impl Inner {
    fn new(base_url: &str) -> Self {
        Self {
            config: ServiceConfig::new(base_url),
            collector: InputCollector::new(".pdf")
                .require_field(TITLE_FIELD)
                .require_field(INSTRUCTIONS_FIELD),
            process: TaskController::new(Phase::Processing),
            naming: ArtifactNaming::fixed(OUTPUT_NAME),
        }
    }

    fn input_changed(&mut self) {
        self.process.input_changed(self.collector.is_ready());
    }

    fn set_file(&mut self, name: &str) -> Result<(), FlowError> {
        self.collector.set_file(name)?;
        self.input_changed();
        Ok(())
    }

    fn clear_file(&mut self) {
        self.collector.clear_file();
        self.input_changed();
    }

    fn set_field(&mut self, label: &str, value: &str) -> Result<(), FlowError> {
        self.collector.set_field(label, value)?;
        self.input_changed();
        Ok(())
    }

    fn artifact(&self) -> Option<&[u8]> {
        match self.process.result() {
            Some(Outcome::Binary(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

/// The browser-facing app object, constructed with the service address
/// injected by the host page.
#[wasm_bindgen]
pub struct DocmillApp {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl DocmillApp {
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: &str) -> DocmillApp {
        console_error_panic_hook::set_once();
        DocmillApp {
            inner: Rc::new(RefCell::new(Inner::new(base_url))),
        }
    }

    /// Record the dropped/selected file. Fails for non-PDF names.
    #[wasm_bindgen(js_name = setFile)]
    pub fn set_file(&self, name: &str) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .set_file(name)
            .map_err(|e| JsValue::from_str(&e.user_message(Phase::Processing)))
    }

    #[wasm_bindgen(js_name = clearFile)]
    pub fn clear_file(&self) {
        self.inner.borrow_mut().clear_file();
    }

    #[wasm_bindgen(js_name = setTitle)]
    pub fn set_title(&self, value: &str) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .set_field(TITLE_FIELD, value)
            .map_err(|e| JsValue::from_str(&e.user_message(Phase::Processing)))
    }

    #[wasm_bindgen(js_name = setInstructions)]
    pub fn set_instructions(&self, value: &str) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .set_field(INSTRUCTIONS_FIELD, value)
            .map_err(|e| JsValue::from_str(&e.user_message(Phase::Processing)))
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().collector.is_ready()
    }

    /// True while the processing call is outstanding.
    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.inner.borrow().process.is_in_flight()
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.borrow().process.state()).to_string()
    }

    #[wasm_bindgen(getter, js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.inner.borrow().process.error_message().map(String::from)
    }

    /// True once a processed document is available for download.
    #[wasm_bindgen(js_name = hasArtifact)]
    pub fn has_artifact(&self) -> bool {
        self.inner.borrow().artifact().is_some()
    }

    /// Submit the armed document and fields for processing.
    /// Single-flight: a no-op while a call is outstanding; an immediate
    /// failure when input is not ready (no network call is made).
    pub async fn submit(&self, file: File) -> Result<(), JsValue> {
        let (ticket, url, title, instructions, timeout_ms) = {
            let mut inner = self.inner.borrow_mut();
            let readiness = inner.collector.check_ready();
            let ticket = match inner.process.begin_submit(readiness) {
                Ok(ticket) => ticket,
                // Refused or failed validation; state already reflects it.
                Err(_) => return Ok(()),
            };
            (
                ticket,
                inner.config.endpoint(PROCESS_ENDPOINT),
                inner.collector.field(TITLE_FIELD).unwrap_or_default().to_string(),
                inner
                    .collector
                    .field(INSTRUCTIONS_FIELD)
                    .unwrap_or_default()
                    .to_string(),
                inner.config.timeout_ms,
            )
        };

        let form = FormData::new()?;
        form.append_with_str(TITLE_FIELD, &title)?;
        form.append_with_str(INSTRUCTIONS_FIELD, &instructions)?;
        form.append_with_blob_and_filename(FILE_FIELD, &file, &file.name())?;

        let resolution = match post_multipart(&url, &form, timeout_ms).await {
            Ok(raw) => interpret(Expectation::Binary, raw),
            Err(err) => Err(err),
        };
        if let Err(err) = &resolution {
            web_sys::console::error_1(&format!("Processing error: {}", err).into());
        }

        self.inner.borrow_mut().process.complete(ticket, resolution);
        Ok(())
    }

    /// Hand the processed document to the browser's save flow. Local
    /// only; the artifact was already received at submit time.
    #[wasm_bindgen(js_name = downloadArtifact)]
    pub fn download_artifact(&self) -> Result<(), JsValue> {
        let inner = self.inner.borrow();
        let bytes = inner
            .artifact()
            .ok_or_else(|| JsValue::from_str("No processed document to download"))?;
        let filename = inner.naming.filename(chrono::Utc::now().date_naive());
        trigger_download(bytes, &filename)
    }
}

fn state_name(state: TaskState) -> &'static str {
    match state {
        TaskState::Idle => "idle",
        TaskState::Armed => "armed",
        TaskState::InFlight => "in-flight",
        TaskState::Succeeded => "succeeded",
        TaskState::Failed => "failed",
    }
}
