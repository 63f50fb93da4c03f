use std::sync::Arc;

use dinnersaurus::configuration::get_configuration;
use dinnersaurus::configuration::Settings;
use dinnersaurus::startup::Application;
use dinnersaurus::store::MemoryWaitlistStore;
use dinnersaurus::telemetry::get_subscriber;
use dinnersaurus::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Init the tracing subscriber once for the whole test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the match arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber).expect("init tracing");
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber).expect("init tracing");
        }
    };
});

pub struct TestApp {
    pub addr: String,
    /// The same store the server writes to; inspect it to check side effects
    pub store: Arc<MemoryWaitlistStore>,
    /// Stands in for the transactional email API
    pub email_server: MockServer,
    /// Keeps cookies (for flash messages) and does not follow redirects
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// `POST /api/send` with `body` sent as-is, labelled as JSON
    pub async fn post_send(
        &self,
        body: impl Into<String>,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/send", self.addr))
            .header("Content-Type", "application/json")
            .body(body.into())
            .send()
            .await
            .expect("execute request")
    }

    /// `POST /waitlist` with a raw urlencoded body
    pub async fn post_waitlist(
        &self,
        body: impl Into<String>,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}/waitlist", self.addr))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.into())
            .send()
            .await
            .expect("execute request")
    }

    /// Submit the landing page form with `email`
    pub async fn join_waitlist(
        &self,
        email: &str,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}/waitlist", self.addr))
            .form(&[("email", email)])
            .send()
            .await
            .expect("execute request")
    }

    pub async fn get_home_html(&self) -> String {
        self.api_client
            .get(format!("{}/", self.addr))
            .send()
            .await
            .expect("execute request")
            .text()
            .await
            .unwrap()
    }
}

/// Email API accepts every send; `n` sends are expected
pub async fn mount_email_ok(
    email_server: &MockServer,
    n: u64,
) {
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794" })),
        )
        .expect(n)
        .mount(email_server)
        .await;
}

/// Email API rejects every send; `n` sends are expected
pub async fn mount_email_failure(
    email_server: &MockServer,
    n: u64,
) {
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(n)
        .mount(email_server)
        .await;
}

pub fn assert_is_redirect_to(
    resp: &reqwest::Response,
    location: &str,
) {
    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(resp.headers().get("Location").unwrap(), location);
}

/// Spawn the app with the default (local) config, a random port, an empty
/// in-memory store and a fresh mock email API.
pub async fn spawn_app() -> TestApp { spawn_app_with(|_| {}).await }

/// As `spawn_app`, with a chance to tweak the config before the app is built
pub async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("read configuration");
        // port 0 is reserved by the OS; the server is bound to a random free
        // port, which is then retrieved with `get_port`
        cfg.application.port = 0;
        cfg.email_client.base_url = email_server.uri();
        configure(&mut cfg);
        cfg
    };

    let store = Arc::new(MemoryWaitlistStore::new());
    let app = Application::build_with_store(cfg, store.clone())
        .await
        .expect("build application");
    let port = app.get_port();
    let addr = format!("http://localhost:{port}");
    tokio::spawn(app.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        addr,
        store,
        email_server,
        api_client,
    }
}
