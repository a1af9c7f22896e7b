use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::client::RecordStore;
use crate::date_window::Clock;
use crate::error::AggregationError;
use crate::service::{Aggregate, PipelineService, RawParams};

pub fn router<S, C>(service: Arc<PipelineService<S, C>>) -> Router
where
    S: RecordStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/negocios/:stage/:status/:period",
            get(get_aggregate::<S, C>),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_aggregate<S, C>(
    State(service): State<Arc<PipelineService<S, C>>>,
    Path(params): Path<RawParams>,
) -> Result<Json<Aggregate>, AggregationError>
where
    S: RecordStore + 'static,
    C: Clock + 'static,
{
    match service.handle(params).await {
        Ok(aggregate) => Ok(Json(aggregate)),
        Err(e) => {
            if let AggregationError::Internal(message) = &e {
                error!(%message, "aggregation failed");
            }
            Err(e)
        }
    }
}
