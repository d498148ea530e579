use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("could not reach the submission endpoint")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint replied {status} with a body that could not be read: {body}")]
    UnexpectedReply { status: u16, body: String },

    #[error("a submission is already in flight")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ContactError>;
