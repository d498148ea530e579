//! Submission state machine.

use crate::fields::FieldError;
use serde::Serialize;

/// What the endpoint made of a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionReply {
    Succeeded,
    Invalid(Vec<FieldError>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "errors", rename_all = "snake_case")]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(Vec<FieldError>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    Submit,
    /// Local validation failed before anything was sent.
    Rejected(Vec<FieldError>),
    Reply(SubmissionReply),
    BannerExpired,
}

impl FormState {
    pub fn transition(self, event: FormEvent) -> FormState {
        match (self, event) {
            (FormState::Submitting, FormEvent::Reply(SubmissionReply::Succeeded)) => FormState::Succeeded,
            (FormState::Submitting, FormEvent::Reply(SubmissionReply::Invalid(errors))) => {
                FormState::Failed(errors)
            }
            // One submission at a time.
            (FormState::Submitting, _) => FormState::Submitting,
            (_, FormEvent::Submit) => FormState::Submitting,
            (_, FormEvent::Rejected(errors)) => FormState::Failed(errors),
            (FormState::Succeeded, FormEvent::BannerExpired) => FormState::Idle,
            (state, _) => state,
        }
    }

    /// The success banner shows exactly while the form is `Succeeded`.
    pub fn banner_visible(&self) -> bool {
        matches!(self, FormState::Succeeded)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            FormState::Failed(errors) => errors,
            _ => &[],
        }
    }

    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors()
            .iter()
            .filter(move |e| e.field.as_deref() == Some(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_error() -> Vec<FieldError> {
        vec![FieldError::field("email", "TYPE_EMAIL", "should be an email")]
    }

    #[test]
    fn successful_round_trip_ends_idle_after_the_banner() {
        let state = FormState::Idle
            .transition(FormEvent::Submit)
            .transition(FormEvent::Reply(SubmissionReply::Succeeded));
        assert!(state.banner_visible());
        let state = state.transition(FormEvent::BannerExpired);
        assert_eq!(state, FormState::Idle);
        assert!(!state.banner_visible());
    }

    #[test]
    fn validation_errors_are_resubmittable() {
        let failed = FormState::Idle
            .transition(FormEvent::Submit)
            .transition(FormEvent::Reply(SubmissionReply::Invalid(email_error())));
        assert_eq!(failed.errors_for("email").count(), 1);
        assert_eq!(failed.errors_for("name").count(), 0);
        assert_eq!(failed.transition(FormEvent::Submit), FormState::Submitting);
    }

    #[test]
    fn submitting_ignores_everything_but_the_reply() {
        let s = FormState::Submitting;
        assert_eq!(s.clone().transition(FormEvent::Submit), FormState::Submitting);
        assert_eq!(s.clone().transition(FormEvent::BannerExpired), FormState::Submitting);
        assert_eq!(s.transition(FormEvent::Rejected(email_error())), FormState::Submitting);
    }

    #[test]
    fn stale_banner_expiry_does_not_reset_other_states() {
        let failed = FormState::Failed(email_error());
        assert_eq!(failed.clone().transition(FormEvent::BannerExpired), failed);
        assert_eq!(FormState::Idle.transition(FormEvent::BannerExpired), FormState::Idle);
    }

    #[test]
    fn local_rejection_never_shows_the_banner() {
        let state = FormState::Succeeded.transition(FormEvent::Rejected(email_error()));
        assert!(!state.banner_visible());
        assert_eq!(state.errors().len(), 1);
    }
}
