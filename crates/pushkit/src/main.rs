//! pushkit - Demo Entry Point
//!
//! Runs one page session end to end: register, subscribe, receive a push,
//! click it, unsubscribe.
//!
//! `--offline` answers server calls locally instead of contacting the origin.

use anyhow::Context;
use pushkit::net::{HttpTransport, RecordingTransport, ReqwestTransport};
use pushkit::worker::WorkerOutcome;
use pushkit::{Config, Session};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting pushkit v{}", pushkit::VERSION);

    let config = Config::from_env();
    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");

    if offline {
        run(&config, RecordingTransport::ok())
    } else {
        let transport = ReqwestTransport::new().context("building HTTP client")?;
        run(&config, transport)
    }
}

fn run<T: HttpTransport>(config: &Config, transport: T) -> anyhow::Result<()> {
    let session = Session::new(config, transport).context("starting session")?;

    smol::block_on(async {
        if !session.init().await {
            anyhow::bail!("notification worker could not be registered");
        }

        let subscription = session
            .manager()
            .request_permission()
            .await
            .context("subscribing")?;
        tracing::info!("Subscription endpoint: {}", subscription.endpoint);

        let payload = serde_json::json!({
            "title": "Order ready",
            "body": "Your prescription is ready for pickup",
            "data": {"url": "/orders"},
        });
        if let Some(WorkerOutcome::Displayed(notification)) = session
            .deliver_push(Some(payload.to_string().into_bytes()))
            .await?
        {
            tracing::info!("Shown: {}", notification.title);
            if let WorkerOutcome::OpenedWindow(url) = session.click(&notification).await? {
                tracing::info!("Opened {}", url);
            }
        }

        session.manager().unsubscribe().await.context("unsubscribing")?;
        Ok(())
    })?;

    let handled = session.shutdown();
    tracing::info!("Worker handled {} events", handled);
    Ok(())
}
