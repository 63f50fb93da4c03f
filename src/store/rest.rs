use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use super::StoreError;
use super::WaitlistStore;
use crate::configuration::RestStoreSettings;
use crate::domain::WaitlistEmail;
use crate::domain::WaitlistEntry;

/// A table exposed through PostgREST, which is what hosted Postgres services
/// such as Supabase put in front of the database. The table is expected to
/// have a `UNIQUE` constraint on `email`; PostgREST reports violations as
/// `409 Conflict`.
pub struct RestWaitlistStore {
    http_client: Client,
    base_url: String,
    table: String,
    api_key: Secret<String>,
}

#[derive(Deserialize)]
struct WaitlistRow {
    email: String,
}

#[derive(Serialize)]
struct NewWaitlistRow<'a> {
    email: &'a str,
}

impl RestWaitlistStore {
    pub fn new(settings: RestStoreSettings) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            http_client,
            base_url: settings.base_url,
            table: settings.table,
            api_key: settings.api_key,
        })
    }

    fn table_url(&self) -> String { format!("{}/rest/v1/{}", self.base_url, self.table) }

    /// PostgREST wants the key twice: `apikey` selects the project, the bearer
    /// token selects the role
    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }
}

#[async_trait]
impl WaitlistStore for RestWaitlistStore {
    #[tracing::instrument(name = "Looking up waitlist entry", skip(self))]
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        let rows = self
            .authorized(self.http_client.get(self.table_url()))
            .query(&[
                ("select", "email".to_string()),
                ("email", format!("eq.{email}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .context("Failed to query the waitlist table")?
            .error_for_status()
            .context("Waitlist lookup was rejected")?
            .json::<Vec<WaitlistRow>>()
            .await
            .context("Failed to decode waitlist rows")?;

        match rows.into_iter().next() {
            None => Ok(None),
            Some(row) => {
                // rows written by other clients are not trusted to be normalised
                let email = WaitlistEmail::parse(row.email).map_err(anyhow::Error::msg)?;
                Ok(Some(WaitlistEntry { email }))
            }
        }
    }

    #[tracing::instrument(name = "Inserting waitlist entry", skip(self))]
    async fn insert(
        &self,
        email: &WaitlistEmail,
    ) -> Result<WaitlistEntry, StoreError> {
        let resp = self
            .authorized(self.http_client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&[NewWaitlistRow {
                email: email.as_ref(),
            }])
            .send()
            .await
            .context("Failed to insert into the waitlist table")?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(StoreError::Duplicate(email.clone()));
        }
        resp.error_for_status()
            .context("Waitlist insert was rejected")?;

        Ok(WaitlistEntry {
            email: email.clone(),
        })
    }
}
