use anyhow::Result;
use onair::config::Config;
use onair::service::LiveService;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate()?;

    onair::logging::init_logging(&config.logging)?;
    info!(
        "OnAir {} starting; timezone={}",
        env!("APP_VERSION"),
        config.timezone
    );

    let service = Arc::new(LiveService::new(config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresh_service = Arc::clone(&service);
    let refresh_task = tokio::spawn(async move { refresh_service.run(shutdown_rx).await });

    #[cfg(feature = "web")]
    let web_task = {
        let web_service = Arc::clone(&service);
        let (host, port) = (
            web_service.config().web.host.clone(),
            web_service.config().web.port,
        );
        tokio::spawn(async move {
            if let Err(e) = onair::web::serve(web_service, &host, port).await {
                error!("Web server error: {}", e);
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(true);

    #[cfg(feature = "web")]
    web_task.abort();

    match refresh_task.await {
        Ok(Ok(())) => {
            info!("Shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Refresh loop failed: {}", e);
            Err(anyhow::anyhow!("Refresh loop error: {}", e))
        }
        Err(e) => Err(anyhow::anyhow!("Refresh task panicked: {}", e)),
    }
}
