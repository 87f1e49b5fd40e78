use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use now_playing_rpc::config::{Config, CONFIG_FILE};
use now_playing_rpc::covers::{select_host, CoverArt};
use now_playing_rpc::logging;
use now_playing_rpc::presence::{DiscordSink, DISCORD_APP_ID};
use now_playing_rpc::reconciler::Reconciler;
use now_playing_rpc::server::ServerClient;

/// Bounded timeout so an unresponsive dependency cannot stall the poll
/// loop indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::load(Path::new(CONFIG_FILE))?;

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let server = ServerClient::new(http.clone(), config.base_url.clone());
    let covers = CoverArt::new(server.clone(), select_host(&config.images, http));
    let sink = DiscordSink::login(DISCORD_APP_ID).context("failed to connect to Discord")?;

    let mut reconciler = Reconciler::new(server, covers, sink);

    tracing::info!(
        base_url = %config.base_url,
        interval_sec = config.poll_interval_sec,
        "rich presence is running, press Ctrl+C to exit"
    );

    // The first interval tick completes immediately, so the initial
    // reconciliation happens at startup rather than one period later.
    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_sec));
    loop {
        tokio::select! {
            _ = interval.tick() => reconciler.tick().await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down");
    reconciler.shutdown();
    Ok(())
}
