use dinnersaurus::configuration::get_configuration;
use dinnersaurus::startup::Application;
use dinnersaurus::telemetry::get_subscriber;
use dinnersaurus::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    // RUST_LOG overrides the default level; pipe into `bunyan` to read locally
    let subscriber = get_subscriber("dinnersaurus", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    // missing store/email credentials are fatal here, before anything binds
    let cfg = get_configuration()?;

    let server = Application::build(cfg).await?;
    tracing::info!(port = server.get_port(), "Listening");

    if let Err(e) = server.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "API failed"
        );
        return Err(e.into());
    }
    tracing::info!("API exited gracefully");

    Ok(())
}
