use std::net::TcpListener;
use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::ExposeSecret;
use secrecy::Secret;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::configuration::StoreSettings;
use crate::email_template::EmailTemplates;
use crate::notification::HttpNotifier;
use crate::notification::NotificationDispatcher;
use crate::notification::Notifier;
use crate::routes::health_check;
use crate::routes::home;
use crate::routes::join_waitlist;
use crate::routes::send_notification;
use crate::signup::SignupService;
use crate::store::MemoryWaitlistStore;
use crate::store::PgWaitlistStore;
use crate::store::RestWaitlistStore;
use crate::store::WaitlistStore;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Build every collaborator from `cfg` and bind the listener. Port `0`
    /// picks a random free port (see `get_port`).
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let store = get_waitlist_store(&cfg.store)?;
        Self::build_with_store(cfg, store).await
    }

    /// As `build`, but with the store supplied by the caller (ignoring
    /// `cfg.store`), e.g. an in-memory one in tests
    pub async fn build_with_store(
        cfg: Settings,
        store: Arc<dyn WaitlistStore>,
    ) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(&addr).with_context(|| format!("Failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        let email_timeout = cfg.email_client.timeout();
        let email_client = cfg.email_client.client()?;
        let templates = EmailTemplates::new().context("Failed to compile email templates")?;
        let dispatcher = Arc::new(NotificationDispatcher::new(email_client, templates));

        // the dispatcher call covers a full provider round trip, so give it
        // room on top of the provider timeout
        let notifier: Arc<dyn Notifier> = match &cfg.application.dispatcher_url {
            Some(url) => Arc::new(HttpNotifier::new(url, email_timeout * 2)?),
            None => dispatcher.clone(),
        };
        let signup = Arc::new(SignupService::new(store, notifier));

        let server = run(listener, dispatcher, signup, cfg.application.hmac_secret)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

pub fn get_waitlist_store(store_cfg: &StoreSettings) -> Result<Arc<dyn WaitlistStore>, anyhow::Error> {
    let store: Arc<dyn WaitlistStore> = match store_cfg {
        StoreSettings::Rest(rest) => Arc::new(RestWaitlistStore::new(rest.clone())?),
        StoreSettings::Postgres(db) => Arc::new(PgWaitlistStore::connect_lazy(db)),
        StoreSettings::Memory => {
            tracing::warn!("Using the in-memory waitlist store; entries are lost on restart");
            Arc::new(MemoryWaitlistStore::new())
        }
    };
    Ok(store)
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    dispatcher: Arc<NotificationDispatcher>,
    signup: Arc<SignupService>,
    hmac_secret: Secret<String>,
) -> Result<Server, anyhow::Error> {
    // `Key::from` panics on short keys
    let secret_key = Key::try_from(hmac_secret.expose_secret().as_bytes())
        .map_err(|e| anyhow::anyhow!("hmac_secret is not a usable cookie key: {e}"))?;

    // the outcome of `POST /waitlist` travels to `GET /` in a signed cookie
    let cookie_store = CookieMessageStore::builder(secret_key).build();
    let msg_framework = FlashMessagesFramework::builder(cookie_store).build();

    // `Data` is externally an `Arc` (for sharing/cloning); `From<Arc<T>>` lets
    // the dispatcher be shared with the in-process notifier
    let dispatcher = web::Data::from(dispatcher);
    let signup = web::Data::from(signup);

    // actix spins up one worker per core, each running this closure, hence
    // the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(msg_framework.clone())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/waitlist", web::post().to(join_waitlist))
            .route("/api/send", web::post().to(send_notification))
            .app_data(dispatcher.clone())
            .app_data(signup.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
