pub mod analytics;
pub mod bulk;
pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod models;
pub mod provider;
pub mod store;
pub mod tone;

use analytics::AnalyticsReport;
use chrono::Utc;
use clipboard::{Clipboard, SystemClipboard};
use config::DashboardConfig;
use debounce::InputController;
use error::{DashboardError, DashboardResult};
use gemini::GeminiClient;
use models::{AnalysisResult, ProviderMode};
use provider::{AnalysisProvider, ToneProvider};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use store::ResultStore;
use tone::{ToneOutcome, ToneSession, ToneView};
use uuid::Uuid;

// ============ Dashboard State ============

/// Everything the coordinator mutates; only ever touched under the dashboard lock
#[derive(Debug)]
struct DashboardState {
    store: ResultStore,
    loading: bool,
    error: Option<String>,  // at most one active message
    show_guidance: bool,    // first-run onboarding, off after first success
    input: InputController,
    tone: ToneSession,
}

/// Clears `loading` when a submission ends without reaching its normal exit,
/// e.g. when the caller drops the future mid-request
struct LoadingGuard {
    state: Arc<Mutex<DashboardState>>,
    armed: bool,
}

impl LoadingGuard {
    fn new(state: Arc<Mutex<DashboardState>>) -> Self {
        Self { state, armed: true }
    }

    /// Call with the dashboard lock held, after `loading` was reset
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.loading = false;
            logging::log_analysis(None, "Batch abandoned before completion, loading cleared");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub current_results: Vec<AnalysisResult>,
    pub history: Vec<AnalysisResult>,
    pub loading: bool,
    pub error: Option<String>,
    pub show_guidance: bool,
    pub tone: ToneView,
    pub analytics: AnalyticsReport,
}

// ============ Dashboard ============

/// Coordinates submissions, provider calls, the result store and the tone session.
///
/// Cheap to clone; clones share state. The lock is never held across a
/// provider call, and a batch submitted while another is in flight is
/// rejected with `DashboardError::Busy`.
#[derive(Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    session_id: String,
    analysis_provider: Arc<dyn AnalysisProvider>,
    tone_provider: Arc<dyn ToneProvider>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        analysis_provider: Arc<dyn AnalysisProvider>,
        tone_provider: Arc<dyn ToneProvider>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let state = DashboardState {
            store: ResultStore::new(),
            loading: false,
            error: None,
            show_guidance: true,
            input: InputController::new(
                Duration::from_millis(config.debounce_ms),
                config.auto_trigger_min_chars,
            ),
            tone: ToneSession::new(),
        };

        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
            analysis_provider,
            tone_provider,
            clipboard,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Wire up the Gemini client for both providers, with file logging when configured
    pub fn from_config(config: DashboardConfig) -> DashboardResult<Self> {
        if let Some(dir) = &config.log_dir {
            if let Err(e) = logging::init_logging(dir) {
                eprintln!("Failed to initialize logging: {}", e);
            }
            let _ = logging::cleanup_old_logs();
        }

        let client = Arc::new(
            GeminiClient::from_config(&config).map_err(|e| DashboardError::config(e.to_string()))?,
        );

        Ok(Self::new(
            config,
            client.clone(),
            client,
            Arc::new(SystemClipboard::detect()),
        ))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============ Analysis Submission ============

    /// Submit a batch to the analysis provider in one round trip
    pub async fn submit_batch(
        &self,
        texts: Vec<String>,
        mode: ProviderMode,
    ) -> DashboardResult<Vec<AnalysisResult>> {
        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(DashboardError::EmptyInput);
        }

        {
            let mut state = self.lock();
            if state.loading {
                logging::log_analysis(Some(&self.session_id), "Rejected batch: request already in flight");
                return Err(DashboardError::Busy);
            }
            state.loading = true;
            state.error = None;
        }
        let loading = LoadingGuard::new(self.state.clone());

        logging::log_analysis(Some(&self.session_id), &format!(
            "Submitting {} texts ({} mode)", texts.len(), mode.as_str()
        ));

        let response = self.analysis_provider.analyze(&texts, mode).await;
        let validated = match response {
            Ok(raw) => provider::validate_batch(&texts, mode, raw),
            Err(e) => Err(e.to_string()),
        };

        let mut state = self.lock();
        state.loading = false;
        loading.disarm();

        match validated {
            Ok(batch) => {
                let results = state.store.record_batch(batch, Utc::now()).to_vec();
                state.show_guidance = false;
                logging::log_analysis(Some(&self.session_id), &format!(
                    "Stored {} results", results.len()
                ));
                Ok(results)
            }
            Err(e) => {
                logging::log_error(Some(&self.session_id), &format!("Analysis failed: {}", e));
                let err = DashboardError::provider(e);
                state.error = err.user_message().map(String::from);
                Err(err)
            }
        }
    }

    /// User-initiated single text; blank input is reported on the error channel
    pub async fn submit_text(&self, text: &str, mode: ProviderMode) -> DashboardResult<Vec<AnalysisResult>> {
        if text.trim().is_empty() {
            let err = DashboardError::EmptyInput;
            self.lock().error = err.user_message().map(String::from);
            return Err(err);
        }
        self.submit_batch(vec![text.to_string()], mode).await
    }

    /// Bulk path for already-read upload contents
    pub async fn submit_upload(
        &self,
        file_name: &str,
        contents: &str,
        mode: ProviderMode,
    ) -> DashboardResult<Vec<AnalysisResult>> {
        let lines = bulk::extract_lines(
            file_name,
            contents,
            self.config.bulk_max_lines,
            self.config.bulk_min_line_chars,
        );
        self.submit_batch(lines, mode).await
    }

    /// Bulk path reading the upload from disk
    pub async fn submit_file(&self, path: &Path, mode: ProviderMode) -> DashboardResult<Vec<AnalysisResult>> {
        let lines = bulk::read_upload(
            path,
            self.config.bulk_max_lines,
            self.config.bulk_min_line_chars,
        )
        .await
        .inspect_err(|e| logging::log_error(Some(&self.session_id), &format!("Upload read failed: {}", e)))?;
        self.submit_batch(lines, mode).await
    }

    // ============ Debounced Input ============

    pub fn on_input(&self, text: &str) {
        self.on_input_at(text, Instant::now());
    }

    pub fn on_input_at(&self, text: &str, now: Instant) {
        self.lock().input.on_input(text, now);
    }

    /// Fire the auto-trigger if the input has settled on new, long-enough text
    pub async fn poll_input_at(
        &self,
        now: Instant,
        mode: ProviderMode,
    ) -> DashboardResult<Option<Vec<AnalysisResult>>> {
        let trigger = self.lock().input.poll(now);
        let Some(text) = trigger else {
            return Ok(None);
        };

        match self.submit_batch(vec![text.clone()], mode).await {
            Ok(results) => Ok(Some(results)),
            Err(DashboardError::Busy) => {
                self.lock().input.forget_submitted(&text);
                Err(DashboardError::Busy)
            }
            Err(e) => Err(e),
        }
    }

    /// Sleep until pending input settles, then run the auto-trigger.
    /// Returns `Ok(None)` once nothing is pending.
    pub async fn settle_input(&self, mode: ProviderMode) -> DashboardResult<Option<Vec<AnalysisResult>>> {
        loop {
            let deadline = self.lock().input.deadline();
            let Some(deadline) = deadline else {
                return Ok(None);
            };

            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

            if let Some(results) = self.poll_input_at(Instant::now(), mode).await? {
                return Ok(Some(results));
            }
        }
    }

    // ============ Store Access ============

    pub fn current_results(&self) -> Vec<AnalysisResult> {
        self.lock().store.current().to_vec()
    }

    pub fn history(&self) -> Vec<AnalysisResult> {
        self.lock().store.history().to_vec()
    }

    pub fn clear_history(&self) {
        self.lock().store.clear_history();
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub fn show_guidance(&self) -> bool {
        self.lock().show_guidance
    }

    pub fn analytics(&self) -> AnalyticsReport {
        let state = self.lock();
        AnalyticsReport::compute(state.store.current(), state.store.history(), &self.config)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.lock();
        DashboardSnapshot {
            current_results: state.store.current().to_vec(),
            history: state.store.history().to_vec(),
            loading: state.loading,
            error: state.error.clone(),
            show_guidance: state.show_guidance,
            tone: state.tone.view(),
            analytics: AnalyticsReport::compute(state.store.current(), state.store.history(), &self.config),
        }
    }

    // ============ Tone Improvement ============

    /// Open a tone session for a negative result and request a rewrite.
    /// A response arriving after the session was dismissed yields `ToneOutcome::Stale`.
    pub async fn request_tone_improvement(&self, result_id: &str) -> DashboardResult<ToneOutcome> {
        let ticket = {
            let mut state = self.lock();
            let result = state
                .store
                .find(result_id)
                .cloned()
                .ok_or_else(|| DashboardError::NotFound(format!("result {}", result_id)))?;
            let ticket = state.tone.begin(&result)?;
            state.error = None;
            ticket
        };

        let response = self
            .tone_provider
            .improve(&ticket.text)
            .await
            .map_err(|e| e.to_string());

        let mut state = self.lock();
        match state.tone.resolve(&ticket, response) {
            ToneOutcome::Failed => {
                let err = DashboardError::improvement(format!("result {}", result_id));
                state.error = err.user_message().map(String::from);
                Err(err)
            }
            outcome => Ok(outcome),
        }
    }

    pub fn dismiss_tone(&self) {
        self.lock().tone.dismiss();
    }

    pub fn tone_view(&self) -> ToneView {
        self.lock().tone.view()
    }

    /// Push the ready suggestion to the clipboard; returns whether there was one to copy
    pub fn copy_improved_text(&self) -> bool {
        let text = self.lock().tone.suggestion().map(|s| s.improved_text.clone());
        match text {
            Some(text) => {
                if let Err(e) = self.clipboard.copy(&text) {
                    logging::log_error(Some(&self.session_id), &format!("Clipboard copy failed: {}", e));
                }
                true
            }
            None => false,
        }
    }
}
