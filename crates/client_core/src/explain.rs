use std::collections::HashMap;

use reqwest::Client;
use serde_json::Value;
use shared::protocol::{ExplainRequest, ExplainResponse};
use tokio::sync::Mutex;
use tracing::error;

use crate::error::RequestFailure;

pub const GENERATING_MESSAGE: &str = "Generating explanation…";
pub const UNAVAILABLE_MESSAGE: &str = "AI explanation unavailable.";
pub const FAILED_MESSAGE: &str = "AI explanation failed.";

/// One finding as carried by its trigger control: issue, severity, and
/// supporting reasons, all opaque and forwarded verbatim.
#[derive(Debug, Clone)]
pub struct IssueCard {
    pub issue: Value,
    pub severity: Value,
    pub reasons: Value,
}

/// Output box state for one finding. `loading` is the in-flight guard; `text`
/// is the last rendered content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    pub loading: bool,
    pub text: String,
}

/// Drives on-demand explanation requests, one panel per finding index.
///
/// Panels are fully independent of each other: the guard only blocks a second
/// request for the same index while one is in flight. There is no queueing,
/// no cancellation, and no client-enforced deadline.
pub struct ExplanationPanels {
    http: Client,
    server_url: String,
    panels: Mutex<HashMap<usize, Panel>>,
}

impl ExplanationPanels {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            panels: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of one panel. Untouched panels read as idle and empty.
    pub async fn panel(&self, index: usize) -> Panel {
        self.panels
            .lock()
            .await
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    /// Asks the service to explain one finding and renders the outcome into
    /// the panel at `index`. A call while that panel is already loading is a
    /// silent no-op. Every accepted request ends with `loading` back at
    /// false, whichever way it resolves.
    pub async fn request_explanation(&self, index: usize, card: &IssueCard) {
        {
            // Guard check and flag set happen under one lock acquisition so
            // two dispatches for the same index cannot both pass.
            let mut panels = self.panels.lock().await;
            let panel = panels.entry(index).or_default();
            if panel.loading {
                return;
            }
            panel.loading = true;
            panel.text = GENERATING_MESSAGE.to_string();
        }

        let text = match self.fetch_explanation(card).await {
            Ok(Some(explanation)) => explanation,
            Ok(None) => UNAVAILABLE_MESSAGE.to_string(),
            Err(failure) => {
                error!(%failure, index, "explanation request failed");
                FAILED_MESSAGE.to_string()
            }
        };

        let mut panels = self.panels.lock().await;
        let panel = panels.entry(index).or_default();
        panel.text = text;
        panel.loading = false;
    }

    /// The service folds its own upstream failures into a normal response
    /// with explanation text, so the status code is not consulted here; only
    /// the transport and body-parse layers can fail. An absent or empty
    /// `explanation` field is an expected outcome, not an error.
    async fn fetch_explanation(
        &self,
        card: &IssueCard,
    ) -> Result<Option<String>, RequestFailure> {
        let body: ExplainResponse = self
            .http
            .post(format!("{}/explain", self.server_url))
            .json(&ExplainRequest {
                issue: card.issue.clone(),
                severity: card.severity.clone(),
                reasons: card.reasons.clone(),
            })
            .send()
            .await?
            .json()
            .await?;
        Ok(body.explanation.filter(|text| !text.is_empty()))
    }
}

#[cfg(test)]
#[path = "tests/explain_tests.rs"]
mod tests;
