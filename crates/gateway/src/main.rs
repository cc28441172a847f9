//! Paper session
//!
//! Loads the gateway configuration (first argument, or the embedded
//! default), builds a simulated connector per enabled entry and runs one
//! monitoring cycle on each of its markets.

use std::error::Error;
use std::sync::Arc;

use log::{error, info};
use xbridge_clock::SystemClock;
use xbridge_gateway::logging::resolve_filter;
use xbridge_gateway::{
    GatewayConfig, SimulatedExchange, init_logging, load_config, load_default_config, run_cycle,
};
use xbridge_ports::{ApiClient, Clock, LogSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config: GatewayConfig = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    config.validate()?;

    let sink = LogSink::new(std::io::stdout());
    init_logging(&sink, &config.log_filter)?;

    let connector_filter = resolve_filter(&config.log_filter);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    for entry in config.enabled_connectors() {
        let mut entry = entry.clone();
        entry.apply_env_overrides();

        let mut client =
            SimulatedExchange::from_config(&entry, clock.clone(), config.trailing_window())?
                .with_log_filter(connector_filter.as_str())
                .with_logger(sink.clone());
        client
            .init(&entry.account_id, &entry.api_key, &entry.api_secret)
            .await?;

        for symbol in client.symbols() {
            match run_cycle(&client, &symbol).await {
                Ok(report) => info!(
                    "{} {}: {} assets, test order {:?}",
                    entry.id,
                    report.symbol,
                    report.assets,
                    report.order.map(|o| o.status)
                ),
                Err(e) => error!("{} {}: cycle failed: {}", entry.id, symbol, e),
            }
        }
    }

    Ok(())
}
