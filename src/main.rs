use anyhow::{Context, Result};
use giin_job_alert::{Config, CrawlPipeline, Delivery, GiinClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,giin_job_alert=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::debug!(?config.delivery_mode, ?config.fetcher, ?config.limits, "configuration loaded");

    let client = GiinClient::new(&config.base_url)?;
    let fetcher = config.build_fetcher().context("failed to start page fetcher")?;
    let notifier = config.build_notifier().context("failed to set up mail delivery")?;

    let delivery = CrawlPipeline::new(fetcher.as_ref())
        .with_limits(config.limits)
        .crawl(&client)
        .context("crawl aborted, no digest sent")?
        .send_empty_digest(config.send_empty_digest)
        .notify(notifier.as_ref())
        .context("digest delivery aborted")?;

    match delivery {
        Delivery::Sent { job_count } => tracing::info!(job_count, "run complete"),
        Delivery::SkippedEmpty => tracing::info!("run complete, nothing to send"),
    }

    Ok(())
}
