use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{Broker, RefreshSummary},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use broker_query_core::brokers::{Broker as CoreBroker, BrokerRefreshServiceTrait};
use broker_query_core::errors::Error as CoreError;

#[utoipa::path(
    get,
    path = "/api/v1/brokers",
    responses(
        (status = 200, body = [Broker]),
        (status = 502, description = "Cache provider fault"),
        (status = 503, description = "Cache provider unavailable")
    )
)]
pub async fn list_brokers(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Broker>>> {
    let brokers = state.broker_store.list_all().await?;
    Ok(Json(brokers.into_iter().map(Broker::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/brokers/{owner}",
    params(("owner" = String, Path, description = "Broker owner")),
    responses((status = 200, body = Broker), (status = 404, description = "No broker for owner"))
)]
pub async fn get_broker(
    Path(owner): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Broker>> {
    let broker = state.broker_store.get(&owner).await?;
    Ok(Json(Broker::from(broker)))
}

/// Stores (or replaces) the broker for `owner`.
#[utoipa::path(
    post,
    path = "/api/v1/brokers/{owner}",
    params(("owner" = String, Path, description = "Broker owner")),
    request_body = Broker,
    responses(
        (status = 200, body = Broker),
        (status = 400, description = "Malformed body, owner mismatch or misfiled stock")
    )
)]
pub async fn create_broker(
    Path(owner): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Broker>, JsonRejection>,
) -> ApiResult<Json<Broker>> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let broker = CoreBroker::try_from(payload).map_err(CoreError::from)?;
    let stored = state.broker_store.put(&owner, broker).await?;
    Ok(Json(Broker::from(stored)))
}

/// Two-decimal display text of the broker.
#[utoipa::path(
    get,
    path = "/api/v1/brokers/{owner}/display",
    params(("owner" = String, Path, description = "Broker owner")),
    responses(
        (status = 200, description = "Display rendering", body = String, content_type = "text/plain"),
        (status = 404, description = "No broker for owner")
    )
)]
pub async fn display_broker(
    Path(owner): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<String> {
    let broker = state.broker_store.get(&owner).await?;
    Ok(broker.render())
}

fn refresh_service(state: &AppState) -> ApiResult<&Arc<dyn BrokerRefreshServiceTrait>> {
    state.refresh_service.as_ref().ok_or_else(|| {
        ApiError::NotImplemented("Portfolio refresh is not configured".to_string())
    })
}

/// Rebuilds the broker for `owner` from the Portfolio service.
#[utoipa::path(
    post,
    path = "/api/v1/brokers/{owner}/refresh",
    params(("owner" = String, Path, description = "Broker owner")),
    responses(
        (status = 200, body = Broker),
        (status = 404, description = "No portfolio for owner"),
        (status = 501, description = "Portfolio service not configured"),
        (status = 502, description = "Portfolio service fault")
    )
)]
pub async fn refresh_broker(
    Path(owner): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Broker>> {
    let broker = refresh_service(&state)?.refresh(&owner).await?;
    Ok(Json(Broker::from(broker)))
}

#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    responses(
        (status = 200, body = RefreshSummary),
        (status = 501, description = "Portfolio service not configured"),
        (status = 502, description = "Portfolio service fault")
    )
)]
pub async fn refresh_all_brokers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RefreshSummary>> {
    let refreshed = refresh_service(&state)?.refresh_all().await?;
    Ok(Json(RefreshSummary { refreshed }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/brokers", get(list_brokers))
        .route("/brokers/{owner}", get(get_broker).post(create_broker))
        .route("/brokers/{owner}/display", get(display_broker))
        .route("/brokers/{owner}/refresh", post(refresh_broker))
        .route("/refresh", post(refresh_all_brokers))
}
