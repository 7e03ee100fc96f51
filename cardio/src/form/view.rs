//! Top-level view: toggles between the form and the result card.

use std::sync::Arc;

use log::debug;

use super::collector::{InputCollector, RejectReason, SubmitOutcome};
use crate::client::{PredictionClient, PredictionResult};
use crate::config::{AppConfig, ResetPolicy};
use crate::models::DisplayResult;

/// What is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Form,
    Result(DisplayResult),
}

/// Owns the [`DisplayResult`] for one submit/reset cycle.
pub struct AppView {
    collector: Arc<InputCollector>,
    view: View,
    reset_policy: ResetPolicy,
}

impl AppView {
    pub fn new(collector: Arc<InputCollector>, reset_policy: ResetPolicy) -> Self {
        Self {
            collector,
            view: View::Form,
            reset_policy,
        }
    }

    /// Wire an HTTP prediction client and a collector from configuration.
    pub fn from_config(config: &AppConfig) -> PredictionResult<Self> {
        let client = PredictionClient::new(&config.service)?;
        let collector = InputCollector::new(Arc::new(client), config.form);
        Ok(Self::new(Arc::new(collector), config.form.reset_policy))
    }

    pub fn collector(&self) -> &InputCollector {
        &self.collector
    }

    /// Shared handle, e.g. for aborting from another task.
    pub fn collector_handle(&self) -> Arc<InputCollector> {
        Arc::clone(&self.collector)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn result(&self) -> Option<&DisplayResult> {
        match &self.view {
            View::Result(result) => Some(result),
            View::Form => None,
        }
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Submit the form; on success the result card becomes visible.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if let View::Result(_) = self.view {
            return SubmitOutcome::Rejected(RejectReason::ResultVisible);
        }

        let mut delivered = None;
        let outcome = self.collector.submit(|result| delivered = Some(result)).await;
        if let Some(result) = delivered {
            self.view = View::Result(result);
        }
        outcome
    }

    /// Dismiss the result card and return to the form.
    ///
    /// Fields are restored or kept according to the reset policy. Returns
    /// the discarded result.
    pub fn reset(&mut self) -> Option<DisplayResult> {
        let View::Result(result) = std::mem::replace(&mut self.view, View::Form) else {
            return None;
        };

        self.collector.clear_error();
        if self.reset_policy == ResetPolicy::RestoreDefaults {
            self.collector.reset_fields();
        }
        debug!("Result dismissed; reset policy {:?}", self.reset_policy);
        Some(result)
    }
}
