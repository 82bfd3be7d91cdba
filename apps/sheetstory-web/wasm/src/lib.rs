//! Spreadsheet analysis app
//!
//! Drop a CSV, submit it for analysis, render the returned findings,
//! and download the full report. All workflow state lives in Rust; the
//! page only renders what the app exposes.
//!
//! Two tasks share the generic flow machinery: the analysis submission
//! (multipart upload, structured outcome) and the report request (JSON
//! body, binary outcome, date-stamped filename).

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use upload_flow::{
    interpret, ArtifactNaming, Expectation, FlowError, InputCollector, Outcome, Phase,
    ServiceConfig, TaskController, TaskState,
};
use upload_flow_web::{post_json, post_multipart, trigger_download};
use wasm_bindgen::prelude::*;
use web_sys::{File, FormData};

const ANALYZE_ENDPOINT: &str = "analyze";
const REPORT_ENDPOINT: &str = "download";
const RESULTS_KEY: &str = "results";
const FILE_FIELD: &str = "csv_file";

/// One finding shaped for rendering: narrative pre-split into
/// paragraphs so the page preserves paragraph boundaries.
#[derive(Debug, Serialize)]
struct ResultView {
    subject: String,
    count: u64,
    average: f64,
    paragraphs: Vec<String>,
}

struct Inner {
    config: ServiceConfig,
    collector: InputCollector,
    analyze: TaskController,
    report: TaskController,
    naming: ArtifactNaming,
}

impl Inner {
    fn new(base_url: &str) -> Self {
        Self {
            config: ServiceConfig::new(base_url),
            collector: InputCollector::new(".csv"),
            analyze: TaskController::new(Phase::Analysis),
            report: TaskController::new(Phase::Download),
            naming: ArtifactNaming::date_stamped("analysis_report", "txt"),
        }
    }

    fn input_changed(&mut self) {
        self.analyze.input_changed(self.collector.is_ready());
        // New input supersedes any previous report task as well.
        self.report.input_changed(false);
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

    /// Admit an analysis submission. A newly admitted analysis
    /// supersedes any prior report task, so at most one error stays
    /// active across a resubmission.
    fn begin_analysis(&mut self) -> Result<upload_flow::TaskTicket, FlowError> {
        let readiness = self.collector.check_ready();
        let ticket = self.analyze.begin_submit(readiness)?;
        self.report.input_changed(false);
        Ok(ticket)
    }

    /// The single active error shown by the page; a report failure wins
    /// over an older analysis message.
    fn error_message(&self) -> Option<&str> {
        self.report.error_message().or(self.analyze.error_message())
    }

    fn results(&self) -> Option<&[upload_flow::AnalysisResult]> {
        match self.analyze.result() {
            Some(Outcome::Structured(results)) => Some(results),
            _ => None,
        }
    }

    fn result_views(&self) -> Vec<ResultView> {
        self.results()
            .unwrap_or_default()
            .iter()
            .map(|r| ResultView {
                subject: r.subject.clone(),
                count: r.count,
                average: r.average,
                paragraphs: r.narrative_paragraphs().iter().map(|p| p.to_string()).collect(),
            })
            .collect()
    }

    /// The report call is ready whenever structured results exist, even
    /// an empty set: an empty report is well-defined.
    fn report_readiness(&self) -> Result<(), FlowError> {
        match self.results() {
            Some(_) => Ok(()),
            None => Err(FlowError::Validation("No results to download".to_string())),
        }
    }

    fn report_body(&self) -> serde_json::Value {
        serde_json::json!({ "results": self.results().unwrap_or_default() })
    }
}

/// The browser-facing app object. Constructed once per page with the
/// service address injected by the host.
#[wasm_bindgen]
pub struct SheetstoryApp {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl SheetstoryApp {
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: &str) -> SheetstoryApp {
        console_error_panic_hook::set_once();
        SheetstoryApp {
            inner: Rc::new(RefCell::new(Inner::new(base_url))),
        }
    }

    /// Record the dropped/selected file. Fails for non-CSV names.
    #[wasm_bindgen(js_name = setFile)]
    pub fn set_file(&self, name: &str) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .set_file(name)
            .map_err(|e| JsValue::from_str(&e.user_message(Phase::Analysis)))
    }

    #[wasm_bindgen(js_name = clearFile)]
    pub fn clear_file(&self) {
        self.inner.borrow_mut().clear_file();
    }

    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(&self) -> Option<String> {
        self.inner.borrow().collector.file_name().map(String::from)
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().collector.is_ready()
    }

    /// True while the analysis call is outstanding; the submit control
    /// stays disabled meanwhile.
    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.inner.borrow().analyze.is_in_flight()
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.borrow().analyze.state()).to_string()
    }

    /// The active error message, if any.
    #[wasm_bindgen(getter, js_name = errorMessage)]
    pub fn error_message(&self) -> Option<String> {
        self.inner.borrow().error_message().map(String::from)
    }

    #[wasm_bindgen(js_name = hasResults)]
    pub fn has_results(&self) -> bool {
        self.inner.borrow().results().is_some()
    }

    /// Findings for rendering, narrative pre-split into paragraphs.
    pub fn results(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().result_views())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Submit the armed CSV for analysis. Single-flight: a no-op while
    /// a call is outstanding; an immediate failure when input is not
    /// ready (no network call is made).
    pub async fn submit(&self, file: File) -> Result<(), JsValue> {
        let (ticket, url, timeout_ms) = {
            let mut inner = self.inner.borrow_mut();
            let ticket = match inner.begin_analysis() {
                Ok(ticket) => ticket,
                // Refused or failed validation; state already reflects it.
                Err(_) => return Ok(()),
            };
            (
                ticket,
                inner.config.endpoint(ANALYZE_ENDPOINT),
                inner.config.timeout_ms,
            )
        };

        let form = FormData::new()?;
        form.append_with_blob_and_filename(FILE_FIELD, &file, &file.name())?;

        let resolution = match post_multipart(&url, &form, timeout_ms).await {
            Ok(raw) => interpret(Expectation::Structured { key: RESULTS_KEY }, raw),
            Err(err) => Err(err),
        };
        if let Err(err) = &resolution {
            web_sys::console::error_1(&format!("Analysis error: {}", err).into());
        }

        self.inner.borrow_mut().analyze.complete(ticket, resolution);
        Ok(())
    }

    /// Request the downloadable report for the current results and hand
    /// it to the browser's save flow under a date-stamped name.
    #[wasm_bindgen(js_name = downloadReport)]
    pub async fn download_report(&self) -> Result<(), JsValue> {
        let (ticket, url, body, timeout_ms) = {
            let mut inner = self.inner.borrow_mut();
            let readiness = inner.report_readiness();
            let ticket = match inner.report.begin_submit(readiness) {
                Ok(ticket) => ticket,
                Err(_) => return Ok(()),
            };
            (
                ticket,
                inner.config.endpoint(REPORT_ENDPOINT),
                inner.report_body(),
                inner.config.timeout_ms,
            )
        };

        let resolution = match post_json(&url, &body, timeout_ms).await {
            Ok(raw) => interpret(Expectation::Binary, raw),
            Err(err) => Err(err),
        };
        if let Err(err) = &resolution {
            web_sys::console::error_1(&format!("Download error: {}", err).into());
        }

        let mut inner = self.inner.borrow_mut();
        inner.report.complete(ticket, resolution);
        if let Some(Outcome::Binary(bytes)) = inner.report.result() {
            let filename = inner.naming.filename(chrono::Utc::now().date_naive());
            trigger_download(bytes, &filename)?;
        }
        Ok(())
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
