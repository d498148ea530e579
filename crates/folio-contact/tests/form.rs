use async_trait::async_trait;
use folio_contact::{
    ContactConfig, ContactError, ContactFields, ContactForm, FieldError, FormState, Result, SubmissionEndpoint,
    SubmissionReply,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Reject,
    Unreachable,
    /// Never replies to the first call, succeeds afterwards.
    StallOnce,
}

struct StubEndpoint {
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
}

impl StubEndpoint {
    fn new(behaviour: Behaviour) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                behaviour,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl SubmissionEndpoint for StubEndpoint {
    async fn submit(&self, _fields: &ContactFields) -> Result<SubmissionReply> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::StallOnce if call == 0 => std::future::pending().await,
            Behaviour::StallOnce => Ok(SubmissionReply::Succeeded),
            Behaviour::Succeed => Ok(SubmissionReply::Succeeded),
            Behaviour::Reject => Ok(SubmissionReply::Invalid(vec![FieldError::field(
                "message",
                "REQUIRED_FIELD_EMPTY",
                "should not be empty",
            )])),
            Behaviour::Unreachable => Err(ContactError::UnexpectedReply {
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }
}

fn filled() -> ContactFields {
    ContactFields {
        name: "Ada Lovelace".into(),
        company: Some("Analytical Engines".into()),
        email: "ada@example.com".into(),
        message: "Let's build something.".into(),
    }
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn banner_shows_for_exactly_four_seconds() {
    init_tracing();
    let (endpoint, calls) = StubEndpoint::new(Behaviour::Succeed);
    let form = ContactForm::new(endpoint, &ContactConfig::default());

    let state = form.submit(&filled()).await.unwrap();
    assert_eq!(state, FormState::Succeeded);
    assert!(form.banner_visible());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(3999)).await;
    settle().await;
    assert!(form.banner_visible(), "banner hidden early");

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert!(!form.banner_visible());
    assert_eq!(form.state(), FormState::Idle);
}

#[tokio::test(start_paused = true)]
async fn missing_name_or_email_never_reaches_the_endpoint() {
    let (endpoint, calls) = StubEndpoint::new(Behaviour::Succeed);
    let form = ContactForm::new(endpoint, &ContactConfig::default());

    for fields in [
        ContactFields {
            name: String::new(),
            ..filled()
        },
        ContactFields {
            email: String::new(),
            ..filled()
        },
    ] {
        let state = form.submit(&fields).await.unwrap();
        assert!(matches!(state, FormState::Failed(_)));
        assert!(state.errors().iter().all(|e| e.field.is_some()));
        assert!(!form.banner_visible());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert!(matches!(form.state(), FormState::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn resubmitting_restarts_the_banner() {
    let (endpoint, calls) = StubEndpoint::new(Behaviour::Succeed);
    let form = ContactForm::new(endpoint, &ContactConfig::default());

    form.submit(&filled()).await.unwrap();
    tokio::time::advance(Duration::from_millis(3000)).await;
    form.submit(&filled()).await.unwrap();

    // The first banner would have expired here.
    tokio::time::advance(Duration::from_millis(3000)).await;
    settle().await;
    assert!(form.banner_visible());

    tokio::time::advance(Duration::from_millis(1000)).await;
    settle().await;
    assert!(!form.banner_visible());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn endpoint_errors_leave_the_form_resubmittable() {
    let (endpoint, _) = StubEndpoint::new(Behaviour::Reject);
    let form = ContactForm::new(endpoint, &ContactConfig::default());
    let state = form.submit(&filled()).await.unwrap();
    assert_eq!(state.errors_for("message").count(), 1);
    assert!(!form.banner_visible());

    let (endpoint, _) = StubEndpoint::new(Behaviour::Unreachable);
    let form = ContactForm::new(endpoint, &ContactConfig::default());
    let state = form.submit(&filled()).await.unwrap();
    let errors = state.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, None, "transport problems are form-level");
    assert!(errors[0].message.contains("503"));
}

#[tokio::test(start_paused = true)]
async fn abandoned_submission_does_not_lock_the_form() {
    let (endpoint, calls) = StubEndpoint::new(Behaviour::StallOnce);
    let form = ContactForm::new(endpoint, &ContactConfig::default());

    let abandoned = tokio::time::timeout(Duration::from_secs(5), form.submit(&filled())).await;
    assert!(abandoned.is_err());
    assert_eq!(form.state(), FormState::Idle);

    let state = form.submit(&filled()).await.unwrap();
    assert_eq!(state, FormState::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
