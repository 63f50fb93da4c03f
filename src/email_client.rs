use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Serialize;
use serde_json::Value;

use crate::domain::WaitlistEmail;

/// Client for a Resend-compatible transactional email API
/// (`POST {base_url}/emails`, bearer auth).
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: WaitlistEmail,
    sender_name: String,
    authorization_token: Secret<String>,
}

// establishing a HTTP connection is expensive, so the `Client` (and its
// connection pool) is built once at startup and shared by every request via
// `web::Data`

/// Request body of the `emails` endpoint
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: WaitlistEmail,
        sender_name: String,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            sender_name,
            authorization_token,
        })
    }

    /// `Name <address>`, as it appears in the `From` header
    pub fn sender(&self) -> String { format!("{} <{}>", self.sender_name, self.sender) }

    /// Send exactly one email; there is no retry. Non-2xx responses are
    /// returned as errors.
    ///
    /// On success the provider's JSON payload is returned as received; its
    /// shape is the provider's business, not ours.
    #[tracing::instrument(
        name = "Sending email via provider",
        skip(self, subject, html_content, text_content),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: &WaitlistEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<Value, reqwest::Error> {
        let url = format!("{}/emails", self.base_url);
        let from = self.sender();
        let body = SendEmailRequest {
            from: &from,
            to: [recipient.as_ref()],
            subject,
            html: html_content,
            text: text_content,
        };

        let payload = self
            .http_client
            .post(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&body)
            .send()
            .await?
            // 4xx/5xx are not errors for `send`, so they must be turned into one
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(payload)
    }
}
