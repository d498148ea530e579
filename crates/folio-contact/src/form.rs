//! # Contact Form
//!
//! Drives `FormState` through one submission at a time and owns the task
//! that hides the success banner.
//!
//! ## Responsibilities
//! - **Validation**: Local required-field checks before anything is sent.
//! - **Submission**: One call to the `SubmissionEndpoint`; transport failures
//!   become a form-level error.
//! - **Banner**: A timer started on success, cancelled by a new submission or
//!   by dropping the form.

use crate::endpoint::SubmissionEndpoint;
use crate::error::{ContactError, Result};
use crate::fields::{ContactFields, FieldError};
use crate::state::{FormEvent, FormState, SubmissionReply};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub form_id: String,
    pub endpoint_base: String,
    /// How long the success banner stays up.
    pub banner_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            form_id: "movyqzwl".to_string(),
            endpoint_base: "https://formspree.io/f".to_string(),
            banner_ms: 4000,
        }
    }
}

impl ContactConfig {
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.endpoint_base.trim_end_matches('/'), self.form_id)
    }
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    // FormState is replaced whole, so a poisoned lock still holds a valid value.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply(state: &Mutex<FormState>, event: FormEvent) -> FormState {
    let mut guard = lock(state);
    let next = std::mem::take(&mut *guard).transition(event);
    *guard = next.clone();
    next
}

/// Puts the form back where it was if a submission is abandoned mid-flight.
struct InFlight<'a> {
    state: &'a Mutex<FormState>,
    previous: Option<FormState>,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let mut state = lock(self.state);
        if matches!(*state, FormState::Submitting) {
            // The banner of an earlier success was cancelled on submit.
            *state = match previous {
                FormState::Succeeded => FormState::Idle,
                other => other,
            };
            warn!("contact submission abandoned before a reply");
        }
    }
}

pub struct ContactForm<E: SubmissionEndpoint> {
    endpoint: E,
    banner: Duration,
    state: Arc<Mutex<FormState>>,
    banner_task: Mutex<Option<JoinHandle<()>>>,
}

impl<E: SubmissionEndpoint> ContactForm<E> {
    pub fn new(endpoint: E, config: &ContactConfig) -> Self {
        Self {
            endpoint,
            banner: Duration::from_millis(config.banner_ms),
            state: Arc::new(Mutex::new(FormState::Idle)),
            banner_task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> FormState {
        lock(&self.state).clone()
    }

    pub fn banner_visible(&self) -> bool {
        lock(&self.state).banner_visible()
    }

    fn cancel_banner(&self) {
        let mut task = self.banner_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    fn schedule_banner_expiry(&self) {
        let deadline = Instant::now() + self.banner;
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            apply(&state, FormEvent::BannerExpired);
            debug!("success banner hidden");
        });
        let mut task = self.banner_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Validates and submits `fields`, returning the state the form lands in.
    ///
    /// Must be called inside a tokio runtime; a success schedules the banner
    /// expiry on it.
    pub async fn submit(&self, fields: &ContactFields) -> Result<FormState> {
        let problems = fields.validate();
        let in_flight = {
            let mut state = lock(&self.state);
            if matches!(*state, FormState::Submitting) {
                return Err(ContactError::Busy);
            }
            self.cancel_banner();
            if !problems.is_empty() {
                warn!(errors = problems.len(), "contact form rejected before sending");
                *state = std::mem::take(&mut *state).transition(FormEvent::Rejected(problems));
                return Ok(state.clone());
            }
            let previous = std::mem::take(&mut *state);
            *state = previous.clone().transition(FormEvent::Submit);
            InFlight {
                state: &*self.state,
                previous: Some(previous),
            }
        };

        let reply = match self.endpoint.submit(fields).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "contact submission failed");
                SubmissionReply::Invalid(vec![FieldError::form(error.to_string())])
            }
        };

        in_flight.finish();
        let state = apply(&self.state, FormEvent::Reply(reply));
        match &state {
            FormState::Succeeded => {
                info!(banner_ms = self.banner.as_millis() as u64, "contact message sent");
                self.schedule_banner_expiry();
            }
            FormState::Failed(errors) => info!(errors = errors.len(), "contact submission returned errors"),
            _ => {}
        }
        Ok(state)
    }
}

impl<E: SubmissionEndpoint> Drop for ContactForm<E> {
    fn drop(&mut self) {
        self.cancel_banner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_base_and_form_id() {
        let config = ContactConfig::default();
        assert_eq!(config.endpoint_url(), "https://formspree.io/f/movyqzwl");

        let config = ContactConfig {
            endpoint_base: "http://localhost:9000/f/".into(),
            form_id: "abc".into(),
            ..ContactConfig::default()
        };
        assert_eq!(config.endpoint_url(), "http://localhost:9000/f/abc");
    }

    #[test]
    fn config_defaults_fill_missing_keys() {
        let config: ContactConfig = serde_json::from_str(r#"{"banner_ms": 1000}"#).unwrap();
        assert_eq!(config.banner_ms, 1000);
        assert_eq!(config.form_id, "movyqzwl");
    }
}
