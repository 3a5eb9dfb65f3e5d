// Proxy main entry point
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use proxy::config::ProxySettings;
use proxy::yahoo::YahooFinance;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = ProxySettings::load()?;
    let provider = Arc::new(YahooFinance::new(&settings)?);
    proxy::serve(settings, provider).await
}
