//! Framework-neutral WASM <-> JavaScript bridge.
//!
//! The engine is synchronous and pure. Hosts that delay or re-submit
//! analyses track requests with [`AnalysisSession`] so only the latest
//! submission is ever shown.

use emcode_core::{
    AnalysisResult, Analyzer, CodingError, CodingTables, EngineConfig, MatchScope, PatientType,
    PayerMode, TierSelection,
};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

mod session;

pub use session::RequestTracker;

#[derive(Deserialize, Default)]
struct JsAnalyzeOptions {
    #[serde(default)]
    patient_type: Option<PatientType>,
    #[serde(default)]
    payer_mode: Option<PayerMode>,
    #[serde(default)]
    tier_selection: Option<TierSelection>,
    #[serde(default)]
    match_scope: Option<MatchScope>,
    #[serde(default)]
    max_minutes: Option<u32>,
    /// Table document as accepted by `emcode-tables`.
    #[serde(default)]
    tables: Option<serde_json::Value>,
}

impl From<&JsAnalyzeOptions> for EngineConfig {
    fn from(opts: &JsAnalyzeOptions) -> Self {
        let mut base = EngineConfig::default();
        if let Some(selection) = opts.tier_selection {
            base.tier_selection = selection;
        }
        if let Some(scope) = opts.match_scope {
            base.match_scope = scope;
        }
        if opts.max_minutes.is_some() {
            base.max_minutes = opts.max_minutes;
        }
        base
    }
}

fn parse_options(options: Option<JsValue>) -> Result<JsAnalyzeOptions, JsValue> {
    match options {
        Some(js_opts) if !js_opts.is_undefined() && !js_opts.is_null() => from_value(js_opts)
            .map_err(|err| JsValue::from_str(&format!("Could not read options: {err}"))),
        _ => Ok(JsAnalyzeOptions::default()),
    }
}

fn run(note: &str, opts: &JsAnalyzeOptions) -> Result<AnalysisResult, CodingError> {
    let tables = match &opts.tables {
        Some(document) => emcode_tables::load_tables_value(document)?,
        None => CodingTables::standard(),
    };
    let analyzer = Analyzer::new(tables, EngineConfig::from(opts))?;
    analyzer.analyze(
        note,
        opts.patient_type.unwrap_or_default(),
        opts.payer_mode.unwrap_or_default(),
    )
}

/// Analyze a note and return the result object.
#[wasm_bindgen]
pub fn analyze_note(note: &str, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let result = run(note, &opts).map_err(|err| JsValue::from_str(&format_coding_error(err)))?;

    to_value(&result).map_err(|err| JsValue::from_str(&format!("Could not serialize result: {err}")))
}

/// Render the plain-text export for a result previously returned by `analyze_note`.
#[wasm_bindgen]
pub fn export_report(result: JsValue, note: &str) -> Result<String, JsValue> {
    let result: AnalysisResult = from_value(result)
        .map_err(|err| JsValue::from_str(&format!("Could not read result: {err}")))?;
    Ok(emcode_report::render_text_report(
        &result,
        note,
        &chrono::Local::now(),
    ))
}

/// Suggested download name for today's export.
#[wasm_bindgen]
pub fn export_file_name() -> String {
    emcode_report::report_file_name(chrono::Local::now().date_naive())
}

/// Request tracking for hosts that run analyses asynchronously.
#[wasm_bindgen]
#[derive(Default)]
pub struct AnalysisSession {
    tracker: RequestTracker,
}

#[wasm_bindgen]
impl AnalysisSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new submission; earlier pending ones become stale.
    pub fn begin(&mut self) -> u32 {
        self.tracker.begin()
    }

    #[wasm_bindgen(getter)]
    pub fn pending(&self) -> bool {
        self.tracker.is_pending()
    }

    /// Drop whatever is pending.
    pub fn cancel(&mut self) {
        self.tracker.cancel();
    }

    /// Run the analysis for `token`. Returns `null` when the token is stale.
    pub fn complete(
        &mut self,
        token: u32,
        note: &str,
        options: Option<JsValue>,
    ) -> Result<JsValue, JsValue> {
        if !self.tracker.finish(token) {
            return Ok(JsValue::NULL);
        }
        analyze_note(note, options)
    }
}

fn format_coding_error(err: CodingError) -> String {
    format!("Coding error: {err}")
}
