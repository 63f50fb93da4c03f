use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde_json::Value;

use crate::domain::WaitlistEmail;
use crate::email_client::EmailClient;
use crate::email_template::EmailTemplates;
use crate::email_template::WELCOME_SUBJECT;
use crate::utils::error_chain_fmt;

/// Everything that can go wrong between receiving `POST /api/send` and the
/// provider accepting the email.
///
/// The `Display` strings are exactly what the caller sees in the `error` field
/// of the response body, so they must never include the wrapped error; that
/// only goes to the logs (via `Debug`).
#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid JSON body")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email address")]
    InvalidEmail(String),
    #[error("Failed to generate email template")]
    TemplateError(#[source] tera::Error),
    #[error("Failed to send email")]
    SendError(#[source] reqwest::Error),
    #[error("Internal Server Error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for DispatchError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)?;
        if let Self::InvalidEmail(reason) = self {
            writeln!(f, "Caused by:\n\t{reason}")?;
        }
        Ok(())
    }
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::MissingEmail | Self::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            Self::TemplateError(_) | Self::SendError(_) | Self::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Renders the welcome email and hands it to the provider. One invocation, one
/// send attempt; there is no retry.
pub struct NotificationDispatcher {
    email_client: EmailClient,
    templates: EmailTemplates,
}

impl NotificationDispatcher {
    pub fn new(
        email_client: EmailClient,
        templates: EmailTemplates,
    ) -> Self {
        Self {
            email_client,
            templates,
        }
    }

    #[tracing::instrument(
        name = "Dispatching welcome email",
        skip(self, recipient),
        fields(recipient = %recipient)
    )]
    pub async fn dispatch(
        &self,
        recipient: &WaitlistEmail,
    ) -> Result<Value, DispatchError> {
        // the email address doubles as the greeting; we don't collect names
        let body = self
            .templates
            .render_welcome(recipient.as_ref())
            .map_err(DispatchError::TemplateError)?;

        let payload = self
            .email_client
            .send_email(recipient, WELCOME_SUBJECT, &body.html, &body.text)
            .await
            .map_err(|e| match e.is_decode() {
                // the provider took the request, but its answer is unreadable
                true => DispatchError::UnexpectedError(
                    anyhow::Error::new(e).context("Email provider returned a non-JSON payload"),
                ),
                false => DispatchError::SendError(e),
            })?;

        tracing::info!(
            receipt_id = payload.get("id").and_then(serde_json::Value::as_str),
            "Welcome email accepted by provider"
        );
        Ok(payload)
    }
}
