//! Pull mode: serve `/metrics` for Prometheus to scrape.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{error, info};

use unistat_config::Config;
use unistat_core::StationCollector;
use unistat_core::collector::text_content_type;

use crate::error::CliError;

pub async fn run(config: &Config) -> Result<(), CliError> {
    let watch = super::watch_set(config)?;
    let addr = config.listen_addr()?;
    let client = super::connect(config).await?;

    let collector = Arc::new(StationCollector::new(client, watch));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("listening for connections on http://{addr}/metrics");

    axum::serve(listener, router(collector))
        .with_graceful_shutdown(super::shutdown_signal())
        .await?;
    Ok(())
}

fn router(collector: Arc<StationCollector>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(collector)
}

async fn metrics(State(collector): State<Arc<StationCollector>>) -> Response {
    match collector.render().await {
        Ok(body) => ([(header::CONTENT_TYPE, text_content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "encoding metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
