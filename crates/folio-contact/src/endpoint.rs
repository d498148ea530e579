//! Hosted form-submission endpoint.
//!
//! Formspree accepts a JSON body at `https://formspree.io/f/<form-id>` and,
//! with `Accept: application/json`, replies 2xx on success or 422 with
//! `{"errors": [{"field", "code", "message"}]}`.

use crate::error::{ContactError, Result};
use crate::fields::{ContactFields, FieldError};
use crate::form::ContactConfig;
use crate::state::SubmissionReply;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

/// Where submissions go.
#[async_trait]
pub trait SubmissionEndpoint: Send + Sync {
    async fn submit(&self, fields: &ContactFields) -> Result<SubmissionReply>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Reads a reply into success or the reported errors.
pub fn parse_response(status: u16, body: &str) -> Result<SubmissionReply> {
    if (200..300).contains(&status) {
        return Ok(SubmissionReply::Succeeded);
    }
    let parsed: ErrorBody = serde_json::from_str(body).map_err(|_| ContactError::UnexpectedReply {
        status,
        body: body.chars().take(200).collect(),
    })?;
    let errors = if parsed.errors.is_empty() {
        vec![FieldError::form(format!("submission failed with status {status}"))]
    } else {
        parsed.errors
    };
    Ok(SubmissionReply::Invalid(errors))
}

#[derive(Clone, Debug)]
pub struct FormspreeEndpoint {
    client: reqwest::Client,
    url: String,
}

impl FormspreeEndpoint {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.endpoint_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SubmissionEndpoint for FormspreeEndpoint {
    async fn submit(&self, fields: &ContactFields) -> Result<SubmissionReply> {
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(fields)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, url = %self.url, "submission answered");
        parse_response(status, &body)
    }
}
