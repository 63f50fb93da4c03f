use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::PgConnectOptions;

use crate::domain::WaitlistEmail;
use crate::email_client::EmailClient;

/// Global configuration, loaded from `configuration/*.yaml` and `APP_*` env
/// vars. See `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub email_client: EmailClientSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,

    /// Signs the flash message cookies; must be at least 64 bytes long
    pub hmac_secret: Secret<String>,

    /// If set, the signup form reaches the dispatcher at
    /// `{dispatcher_url}/api/send` instead of calling it in-process
    #[serde(default)]
    pub dispatcher_url: Option<String>,
}

/// Where waitlist entries live. The variant is picked with the `backend` key:
///
/// ```yaml
/// store:
///   backend: rest
///   base_url: "https://xyz.supabase.co"
///   api_key: "..."
/// ```
#[derive(Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreSettings {
    /// Hosted PostgREST table (e.g. Supabase)
    Rest(RestStoreSettings),
    /// Direct connection to a Postgres instance
    Postgres(DatabaseSettings),
    /// Process-local; entries are lost on restart
    Memory,
}

#[derive(Deserialize, Clone)]
pub struct RestStoreSettings {
    pub base_url: String,
    /// The project's public (anon) key; sent as both `apikey` and bearer token
    pub api_key: Secret<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

fn default_table() -> String { "waitlist".to_string() }

impl RestStoreSettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }
}

/// Database configuration
#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub database_name: String,

    /// Should be `true` in production.
    /// https://www.postgresql.org/docs/current/libpq-ssl.html#LIBPQ-SSL-SSLMODE-STATEMENTS
    pub require_ssl: bool,
}

impl DatabaseSettings {
    /// Connection options for the named database. The password is concealed.
    pub fn connection(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .ssl_mode(match self.require_ssl {
                true => sqlx::postgres::PgSslMode::Require,
                false => sqlx::postgres::PgSslMode::Prefer,
            })
            .database(&self.database_name)
    }
}

/// Transactional email API (Resend-compatible)
#[derive(Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    /// Display name in the `From` header, e.g. `Dinnersaurus`
    pub sender_name: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<WaitlistEmail, String> { WaitlistEmail::parse(&self.sender_email) }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn client(self) -> Result<EmailClient, anyhow::Error> {
        let sender = self.sender().map_err(anyhow::Error::msg)?;
        let timeout = self.timeout();
        let client = EmailClient::new(
            self.base_url,
            sender,
            self.sender_name,
            self.authorization_token,
            timeout,
        )?;
        Ok(client)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("{e} is not a supported environment; use `local` or `production`")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// overlay `APP_*` env vars (e.g. `APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN`).
///
/// All fields must be present, otherwise initialisation fails immediately and
/// the server will not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Foreign(Box::new(e)))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for the
            // numeric fields
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
