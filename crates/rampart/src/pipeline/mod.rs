//! Submission pipeline.
//!
//! Owns every form on the page and walks each submit intent through
//! validation, the honeypot, the arithmetic challenge and the rate limit
//! before anything is dispatched:
//!
//! ```text
//! Idle → Validating ─┬─ Rejected
//!                    └─ CheckingChallenge ─┬─ ChallengeFailed
//!                                          ├─ RateLimited
//!                                          └─ Submitting ─┬─ Succeeded
//!                                                         └─ Failed
//! ```
//!
//! The struct has a single owner and is mutated through `&mut self`. The
//! only suspension point is the collaborator call, which the caller awaits
//! between [`Pipeline::begin`] and [`Pipeline::complete`].

mod form;

pub use form::{ControlMode, FieldState, FieldView, FormSession, FormView, SubmitControl};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::captcha::{ChallengeGenerator, check_answer};
use crate::config::{AppConfig, Messages};
use crate::honeypot::Honeypot;
use crate::limiter::{Clock, RateLimitStatus, SubmissionLog};
use crate::notify::{Announcer, Notifier};
use crate::storage::KeyValueStore;
use crate::submitter::{Payload, Receipt, SubmitError, Submitter};
use rampart_common::{RampartError, Stage, SubmitOutcome};

/// A submit intent as sent by the page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    /// Field name → raw value, honeypot included
    #[serde(default)]
    pub values: HashMap<String, String>,

    /// Id of the challenge the answer is for
    #[serde(default)]
    pub challenge_id: Option<String>,

    #[serde(default)]
    pub challenge_answer: String,
}

/// How a submit intent ended
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub form_id: String,
    pub outcome: SubmitOutcome,
    /// States visited after `Idle`, in order
    pub trail: Vec<Stage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_fields: Vec<String>,
}

impl SubmitReport {
    fn new(form_id: &str, outcome: SubmitOutcome, trail: Vec<Stage>) -> Self {
        Self {
            form_id: form_id.to_string(),
            outcome,
            trail,
            invalid_fields: Vec::new(),
        }
    }
}

/// Result of a field-blur intent
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub valid: bool,
    pub error: Option<String>,
}

/// A validated submission waiting on the collaborator.
///
/// Must be handed back to [`Pipeline::complete`]; until then the form's
/// submit control stays disabled.
#[must_use]
pub struct Dispatch {
    form_id: String,
    form_type: String,
    payload: Payload,
    trail: Vec<Stage>,
    submitter: Arc<dyn Submitter>,
}

impl Dispatch {
    /// Invoke the collaborator once
    pub async fn send(&self) -> Result<Receipt, SubmitError> {
        self.submitter.submit(&self.form_id, &self.payload).await
    }
}

/// First phase of a submit intent
pub enum Begin {
    /// All gates passed; await [`Dispatch::send`] then call `complete`
    Dispatched(Dispatch),
    /// Stopped before dispatch
    Finished(SubmitReport),
}

/// Form submission pipeline
pub struct Pipeline {
    forms: Vec<FormSession>,
    validator: crate::validation::FieldValidator,
    generator: ChallengeGenerator,
    honeypot: Honeypot,
    limiter: SubmissionLog,
    store: Box<dyn KeyValueStore>,
    submitter: Arc<dyn Submitter>,
    announcer: Announcer,
    clock: Arc<dyn Clock>,
    messages: Messages,
    /// Dispatches handed out by `begin` and not yet completed
    in_flight: usize,
}

impl Pipeline {
    /// Build every configured form and run the initial rate-limit check
    pub fn new(
        config: &AppConfig,
        store: Box<dyn KeyValueStore>,
        submitter: Arc<dyn Submitter>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let generator = ChallengeGenerator::new(config.captcha.min_operand, config.captcha.max_operand);
        let honeypot = Honeypot::new(config.honeypot_field.clone());

        let forms = config
            .forms
            .iter()
            .map(|form_config| {
                let mut form = FormSession::new(
                    form_config,
                    &config.messages.submit_label,
                    generator.generate(),
                );
                if honeypot.ensure(&mut form) {
                    debug!(form_id = %form.id, field = %honeypot.field_name(), "Added honeypot field");
                }
                form
            })
            .collect();

        let mut pipeline = Self {
            forms,
            validator: crate::validation::FieldValidator::new(config.messages.clone()),
            generator,
            honeypot,
            limiter: SubmissionLog::new(config.rate_limit.max_submissions, config.rate_limit.window_secs),
            store,
            submitter,
            announcer: Announcer::new(notifier, config.notifications.clone()),
            clock,
            messages: config.messages.clone(),
            in_flight: 0,
        };

        let status = pipeline.refresh_rate_limit();
        info!(
            forms = pipeline.forms.len(),
            recent_submissions = status.count,
            throttled = status.is_throttled(),
            "Submission pipeline ready"
        );

        pipeline
    }

    /// Dispatches still waiting on the collaborator
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn form_ids(&self) -> Vec<String> {
        self.forms.iter().map(|f| f.id.clone()).collect()
    }

    pub fn form(&self, form_id: &str) -> Result<&FormSession, RampartError> {
        self.forms
            .iter()
            .find(|f| f.id == form_id)
            .ok_or_else(|| RampartError::UnknownForm(form_id.to_string()))
    }

    fn form_index(&self, form_id: &str) -> Result<usize, RampartError> {
        self.forms
            .iter()
            .position(|f| f.id == form_id)
            .ok_or_else(|| RampartError::UnknownForm(form_id.to_string()))
    }

    /// Snapshot of a form, after re-checking the rate limit
    pub fn view(&mut self, form_id: &str) -> Result<FormView, RampartError> {
        self.refresh_rate_limit();
        Ok(self.form(form_id)?.view())
    }

    /// Evaluate the window and throttle or release every submit control
    pub fn refresh_rate_limit(&mut self) -> RateLimitStatus {
        let now = self.clock.now_ms();
        let status = self.limiter.evaluate(self.store.as_mut(), now);

        if status.is_throttled() {
            self.throttle_all();
        } else {
            for form in &mut self.forms {
                form.control.lift_throttle();
            }
        }

        status
    }

    fn throttle_all(&mut self) {
        for form in &mut self.forms {
            form.control.throttle(&self.messages.rate_limited);
        }
    }

    /// Field-input intent: store the value and drop any inline error
    pub fn on_input(&mut self, form_id: &str, field: &str, value: String) -> Result<(), RampartError> {
        let idx = self.form_index(form_id)?;
        let state = self.forms[idx]
            .field_mut(field)
            .ok_or_else(|| unknown_field(form_id, field))?;

        state.error = None;
        state.value = value;
        Ok(())
    }

    /// Field-blur intent: re-check one field and attach or clear its error
    pub fn on_blur(&mut self, form_id: &str, field: &str) -> Result<FieldReport, RampartError> {
        let idx = self.form_index(form_id)?;
        let state = self.forms[idx]
            .field_mut(field)
            .ok_or_else(|| unknown_field(form_id, field))?;

        state.error = None;
        if !state.is_hidden() {
            state.error = self
                .validator
                .validate(&state.name, state.kind, state.required, &state.value);
        }

        Ok(FieldReport {
            field: state.name.clone(),
            valid: state.error.is_none(),
            error: state.error.clone(),
        })
    }

    /// Run every gate up to dispatch.
    ///
    /// Order is fixed: field validation, honeypot, challenge, rate limit.
    pub fn begin(&mut self, form_id: &str, request: SubmitRequest) -> Result<Begin, RampartError> {
        let idx = self.form_index(form_id)?;
        let form = &mut self.forms[idx];

        if !form.control.is_enabled() {
            debug!(form_id, mode = ?form.control.mode, "Submit control disabled, ignoring intent");
            return Ok(Begin::Finished(SubmitReport::new(
                form_id,
                SubmitOutcome::Blocked,
                Vec::new(),
            )));
        }

        let mut trail = vec![Stage::Validating];
        form.stage = Stage::Validating;
        form.apply_values(&request.values);

        let mut invalid_fields = Vec::new();
        for field in form.fields.iter_mut().filter(|f| !f.is_hidden()) {
            field.error = self
                .validator
                .validate(&field.name, field.kind, field.required, &field.value);
            if field.error.is_some() {
                invalid_fields.push(field.name.clone());
            }
        }

        if !invalid_fields.is_empty() {
            trail.push(Stage::Rejected);
            form.stage = Stage::Idle;
            info!(form_id, ?invalid_fields, "Submission rejected by field validation");
            self.announcer.error(&self.messages.form_invalid);

            let mut report = SubmitReport::new(form_id, SubmitOutcome::Rejected, trail);
            report.invalid_fields = invalid_fields;
            return Ok(Begin::Finished(report));
        }

        trail.push(Stage::CheckingChallenge);
        form.stage = Stage::CheckingChallenge;

        if self.honeypot.is_tripped(form) {
            warn!(form_id, "Spam detected, dropping submission");
            form.stage = Stage::Idle;
            return Ok(Begin::Finished(SubmitReport::new(
                form_id,
                SubmitOutcome::Dropped,
                trail,
            )));
        }

        let verdict = check_answer(
            &form.challenge,
            request.challenge_id.as_deref(),
            &request.challenge_answer,
        );
        if !verdict.is_correct() {
            trail.push(Stage::ChallengeFailed);
            info!(form_id, ?verdict, "Challenge answer rejected");
            form.challenge = self.generator.generate();
            form.stage = Stage::Idle;
            self.announcer.error(&self.messages.challenge_failed);
            return Ok(Begin::Finished(SubmitReport::new(
                form_id,
                SubmitOutcome::ChallengeFailed,
                trail,
            )));
        }

        let status = self
            .limiter
            .evaluate(self.store.as_mut(), self.clock.now_ms())
            .with_pending(self.in_flight);
        if status.is_throttled() {
            trail.push(Stage::RateLimited);
            form.stage = Stage::Idle;
            warn!(
                form_id,
                count = status.count,
                pending = status.pending,
                retry_after_ms = status.retry_after_ms,
                "Submission rate limited"
            );
            self.throttle_all();
            return Ok(Begin::Finished(SubmitReport::new(
                form_id,
                SubmitOutcome::RateLimited,
                trail,
            )));
        }

        trail.push(Stage::Submitting);
        form.stage = Stage::Submitting;
        form.control.start_processing(&self.messages.processing);

        let payload = form.payload();
        let form_type = payload
            .get("role")
            .filter(|role| !role.is_empty())
            .cloned()
            .unwrap_or_else(|| "general".to_string());

        self.in_flight += 1;
        debug!(form_id, fields = payload.len(), in_flight = self.in_flight, "Dispatching submission");

        Ok(Begin::Dispatched(Dispatch {
            form_id: form_id.to_string(),
            form_type,
            payload,
            trail,
            submitter: self.submitter.clone(),
        }))
    }

    /// Apply the collaborator's result to the form that dispatched it
    pub fn complete(
        &mut self,
        dispatch: Dispatch,
        result: Result<Receipt, SubmitError>,
    ) -> Result<SubmitReport, RampartError> {
        let Dispatch {
            form_id,
            form_type,
            mut trail,
            ..
        } = dispatch;

        let idx = self.form_index(&form_id)?;
        self.in_flight = self.in_flight.saturating_sub(1);
        let form = &mut self.forms[idx];
        form.control.finish_processing();

        let outcome = match result {
            Ok(receipt) => {
                trail.push(Stage::Succeeded);
                form.reset();
                form.challenge = self.generator.generate();

                match self.limiter.record(self.store.as_mut(), self.clock.now_ms()) {
                    Ok(count) => info!(
                        form_id = %form_id,
                        form_type = %form_type,
                        recent_submissions = count,
                        receipt = %receipt.message,
                        "Form submitted"
                    ),
                    Err(e) => error!(form_id = %form_id, error = %e, "Failed to record submission"),
                }

                self.announcer.success(&self.messages.submit_success);
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                trail.push(Stage::Failed);
                warn!(form_id = %form_id, error = %e, "Form submission failed");
                self.announcer.error(&self.messages.submit_failure);
                SubmitOutcome::Failed
            }
        };

        form.stage = Stage::Idle;

        Ok(SubmitReport::new(&form_id, outcome, trail))
    }

    /// Run a whole submit intent while holding the pipeline exclusively
    pub async fn submit(
        &mut self,
        form_id: &str,
        request: SubmitRequest,
    ) -> Result<SubmitReport, RampartError> {
        match self.begin(form_id, request)? {
            Begin::Finished(report) => Ok(report),
            Begin::Dispatched(dispatch) => {
                let result = dispatch.send().await;
                self.complete(dispatch, result)
            }
        }
    }
}

fn unknown_field(form_id: &str, field: &str) -> RampartError {
    RampartError::UnknownField {
        form_id: form_id.to_string(),
        field: field.to_string(),
    }
}
