//! Input collector: field state, submission and the busy flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::client::Predictor;
use crate::config::FormConfig;
use crate::models::{
    DisplayResult, Field, FieldError, PredictionRequest, Sex, ValidationError,
};

/// How a call to [`InputCollector::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A result was produced and handed to the callback.
    Delivered,
    /// The prediction failed; the message is also available via
    /// [`InputCollector::error`].
    Failed(String),
    /// Nothing was sent.
    Rejected(RejectReason),
    /// The in-flight request was aborted.
    Cancelled,
}

/// Why a submission was refused without contacting the service.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Another submission is still in flight.
    Busy,
    /// Range enforcement is on and some fields are out of range.
    OutOfRange(ValidationError),
    /// A result is on screen; the form must be reset first.
    ResultVisible,
}

/// Holds the form fields and submits them to a [`Predictor`].
///
/// All methods take `&self`, so a collector can be shared behind an `Arc`
/// between the task that submits and the one that renders or aborts.
pub struct InputCollector {
    predictor: Arc<dyn Predictor>,
    config: FormConfig,
    fields: RwLock<PredictionRequest>,
    error: RwLock<Option<String>>,
    busy: AtomicBool,
    in_flight: Mutex<Option<AbortHandle>>,
}

/// Clears the busy flag however `submit` exits, including being dropped.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    in_flight: &'a Mutex<Option<AbortHandle>>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().take();
        self.busy.store(false, Ordering::Release);
    }
}

impl InputCollector {
    pub fn new(predictor: Arc<dyn Predictor>, config: FormConfig) -> Self {
        Self {
            predictor,
            config,
            fields: RwLock::new(PredictionRequest::default()),
            error: RwLock::new(None),
            busy: AtomicBool::new(false),
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_defaults(predictor: Arc<dyn Predictor>) -> Self {
        Self::new(predictor, FormConfig::default())
    }

    /// Snapshot of the current field values.
    pub fn fields(&self) -> PredictionRequest {
        *self.fields.read()
    }

    pub fn get(&self, field: Field) -> f64 {
        self.fields.read().get(field)
    }

    pub fn set(&self, field: Field, value: f64) {
        self.fields.write().set(field, value);
    }

    pub fn set_sex(&self, sex: Sex) {
        self.set(Field::Gender, sex.code());
    }

    /// Apply a raw form edit by wire name.
    ///
    /// The gender field takes `male`/`female`; every other field takes a
    /// finite number. Returns the stored value.
    pub fn set_from_input(&self, name: &str, raw: &str) -> Result<f64, FieldError> {
        let field: Field = name.parse()?;
        if field == Field::Gender {
            let sex: Sex = raw.parse()?;
            self.set_sex(sex);
            return Ok(sex.code());
        }
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::InvalidValue {
                field,
                value: raw.to_string(),
                reason: "expected a number".to_string(),
            })?;
        self.set(field, value);
        Ok(value)
    }

    /// Replace every field at once.
    pub fn replace_fields(&self, fields: PredictionRequest) {
        *self.fields.write() = fields;
    }

    /// Restore the default baseline.
    pub fn reset_fields(&self) {
        self.replace_fields(PredictionRequest::default());
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Message of the last failed submission, if any.
    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    pub fn clear_error(&self) {
        self.error.write().take();
    }

    /// Cancel the in-flight submission. Returns `false` when idle.
    pub fn abort(&self) -> bool {
        match self.in_flight.lock().take() {
            Some(handle) => {
                handle.abort();
                info!("Aborting in-flight prediction request");
                true
            }
            None => false,
        }
    }

    /// Freeze the fields, send them, and hand the result to `on_result`.
    ///
    /// At most one submission runs at a time; a call made while busy is
    /// rejected and issues no request.
    pub async fn submit<F>(&self, on_result: F) -> SubmitOutcome
    where
        F: FnOnce(DisplayResult),
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission rejected: a prediction is already in flight");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }
        let _guard = BusyGuard {
            busy: &self.busy,
            in_flight: &self.in_flight,
        };

        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.lock() = Some(handle);

        self.clear_error();
        let request = self.fields();

        if let Err(violations) = request.validate() {
            if self.config.enforce_ranges {
                warn!("Submission blocked: {}", violations);
                *self.error.write() = Some(violations.to_string());
                return SubmitOutcome::Rejected(RejectReason::OutOfRange(violations));
            }
            warn!("Submitting despite advisory range violations: {}", violations);
        }

        info!("Submitting prediction request to {}", self.predictor.endpoint());

        match Abortable::new(self.predictor.predict(&request), registration).await {
            Ok(Ok(response)) => {
                let result = DisplayResult::from(response);
                info!(
                    "Prediction delivered: risk={} probability={:.3}",
                    result.risk, result.probability
                );
                on_result(result);
                SubmitOutcome::Delivered
            }
            Ok(Err(err)) => {
                error!("Prediction failed: {}", err);
                let message = err.user_message();
                *self.error.write() = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
            Err(_aborted) => {
                info!("Prediction request cancelled");
                SubmitOutcome::Cancelled
            }
        }
    }
}
