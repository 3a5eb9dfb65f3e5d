// Engine main entry point
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::config::settings::EngineSettings;
use engine::data::history::HistoryLoader;
use engine::data::market_data::MarketDataStore;
use engine::data::quote_client::ProxyClient;
use engine::data::watchlist::WatchlistFile;
use engine::services::{DataFeedServer, DataFeedService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Home Trader data feed...");

    let settings = EngineSettings::load()?;
    let addr: std::net::SocketAddr = settings
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", settings.listen_addr()))?;
    info!(%addr, proxy = %settings.proxy_url, watchlist = %settings.watchlist_path.display(), "Engine configured");

    let market_data_store = Arc::new(RwLock::new(MarketDataStore::new()));
    let source = Arc::new(ProxyClient::new(settings.proxy_url.clone()));
    let history = Arc::new(HistoryLoader::new(market_data_store, source));
    let watchlist = WatchlistFile::new(settings.watchlist_path.clone(), settings.default_labels.clone());

    let service = DataFeedService::new(history, watchlist);

    Server::builder()
        .add_service(DataFeedServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
