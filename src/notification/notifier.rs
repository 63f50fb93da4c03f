use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::NotificationDispatcher;
use crate::domain::WaitlistEmail;

/// How the signup flow asks for the welcome email. Either straight into the
/// in-process `NotificationDispatcher`, or over HTTP to a dispatcher running
/// elsewhere (`HttpNotifier`).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        email: &WaitlistEmail,
    ) -> Result<(), anyhow::Error>;
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify(
        &self,
        email: &WaitlistEmail,
    ) -> Result<(), anyhow::Error> {
        self.dispatch(email).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct NotifyRequest<'a> {
    email: &'a str,
}

/// Calls `POST {dispatcher_url}/api/send` and waits for the response. Any
/// non-2xx status is a failure; the response body is not inspected.
pub struct HttpNotifier {
    http_client: Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(
        dispatcher_url: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: format!("{}/api/send", dispatcher_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[tracing::instrument(name = "Requesting welcome email", skip(self))]
    async fn notify(
        &self,
        email: &WaitlistEmail,
    ) -> Result<(), anyhow::Error> {
        self.http_client
            .post(&self.endpoint)
            .json(&NotifyRequest {
                email: email.as_ref(),
            })
            .send()
            .await
            .context("Failed to reach the notification dispatcher")?
            .error_for_status()
            .context("Failed to send confirmation email.")?;
        Ok(())
    }
}
