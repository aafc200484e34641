//! Server lifecycle: serve the API router on a bound listener until the
//! shutdown future resolves.

use std::future::Future;
use std::sync::Arc;

use sentio_ai::SentimentPipeline;
use tokio::net::TcpListener;

use crate::router::api_router;

/// Serve `/health` and `/predict` on `listener`, draining in-flight requests
/// once `shutdown` completes.
pub async fn serve<F>(
    listener: TcpListener,
    pipeline: Arc<SentimentPipeline>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = api_router(pipeline);

    tracing::info!(%addr, "sentiment API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("sentiment API stopped");
    Ok(())
}
