//! HTTP endpoint serving the metric snapshot.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::collector::Collector;
use crate::encoding::text;
use crate::error::Result;

/// Path of the snapshot endpoint.
pub const METRICS_PATH: &str = "/metrics";

const LANDING_PAGE: &str = r#"<html>
<head><title>MaxScale Exporter</title></head>
<body>
<h1>MaxScale Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

/// Builds the router: a landing page at `/` and the snapshot at
/// [`METRICS_PATH`]. Every snapshot request runs one collection cycle.
pub fn router<C: Collector>(collector: Arc<C>) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route(METRICS_PATH, get(metrics_handler::<C>))
        .with_state(collector)
}

/// Serves [`router`] on `listener` until `shutdown` resolves.
pub async fn serve<C, F>(listener: TcpListener, collector: Arc<C>, shutdown: F) -> Result<()>
where
    C: Collector,
    F: Future<Output = ()> + Send + 'static,
{
    info!(address = %listener.local_addr()?, "serving metrics");
    axum::serve(listener, router(collector))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn metrics_handler<C: Collector>(State(collector): State<Arc<C>>) -> Response {
    let result = collector.collect().await;
    debug!(
        samples = result.samples().len(),
        up = result.up(),
        "collected snapshot"
    );

    let mut buffer = String::new();
    if let Err(e) = text::encode(&mut buffer, result.samples()) {
        error!(error = %e, "failed to encode snapshot");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(CONTENT_TYPE, text::CONTENT_TYPE)], buffer).into_response()
}
