//! # folio-contact
//!
//! The contact form: field validation, the submission state machine, the
//! hosted endpoint client and the timed success banner.

pub mod endpoint;
pub mod error;
pub mod fields;
pub mod form;
pub mod state;

pub use endpoint::{FormspreeEndpoint, SubmissionEndpoint};
pub use error::{ContactError, Result};
pub use fields::{ContactFields, FieldError};
pub use form::{ContactConfig, ContactForm};
pub use state::{FormEvent, FormState, SubmissionReply};
