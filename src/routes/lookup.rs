use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::lookup::{LookupDetailResponse, LookupQuery, LookupResultResponse},
    error::AppError,
    routes::owner::OwnerId,
    services::lookup_service,
    state::SharedState,
};

/// Catalog lookups backing the "add game" form.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/games/lookup", get(search))
        .route("/api/v1/games/lookup/{catalog_id}", get(detail))
}

/// Search the catalog by title.
pub async fn search(
    State(state): State<SharedState>,
    OwnerId(_): OwnerId,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Vec<LookupResultResponse>>, AppError> {
    let hits = lookup_service::search(&state, &query.q).await?;
    Ok(Json(hits.into_iter().map(LookupResultResponse::from).collect()))
}

/// Fetch one catalog entry.
pub async fn detail(
    State(state): State<SharedState>,
    OwnerId(_): OwnerId,
    Path(catalog_id): Path<u64>,
) -> Result<Json<LookupDetailResponse>, AppError> {
    let entry = lookup_service::detail(&state, catalog_id).await?;
    Ok(Json(LookupDetailResponse::new(catalog_id, entry)))
}
