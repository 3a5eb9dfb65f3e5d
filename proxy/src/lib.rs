// HTTP proxy in front of Yahoo Finance
pub mod config;
pub mod error;
pub mod routes;
pub mod yahoo;

use std::convert::Infallible;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use tracing::info;

use config::ProxySettings;
use routes::AppContext;
use yahoo::MarketDataProvider;

pub async fn serve(settings: ProxySettings, provider: Arc<dyn MarketDataProvider>) -> anyhow::Result<()> {
    let addr = settings.listen_addr();
    let ctx = Arc::new(AppContext { provider, settings });

    let make_svc = make_service_fn(move |_conn| {
        let ctx = ctx.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| routes::handle(req, ctx.clone()))) }
    });

    info!("Server running on http://{}", addr);
    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
