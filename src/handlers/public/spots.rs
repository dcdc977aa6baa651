// handlers/public/spots.rs - GET /spots, GET /spots/:id

use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::handlers::{query_rejection, AppState, SpotsQueryString};
use crate::middleware::response::{ApiResponse, ApiResult, PageMeta};
use crate::types::{Spot, SpotsParams};

/// GET /spots - search spots (text never matches ids here)
pub async fn spots_get(
    State(state): State<AppState>,
    query: Result<Query<SpotsQueryString>, QueryRejection>,
) -> ApiResult<Vec<Spot>> {
    let Query(query) = query.map_err(query_rejection)?;
    let params = SpotsParams::from(query);
    let (limit, offset) = params.page();

    let spots = state.surfer.spots(params).await?;
    let meta = PageMeta { limit, offset, count: spots.len() };
    Ok(ApiResponse::success(spots).with_meta(meta))
}

/// GET /spots/:id
pub async fn spot_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Spot> {
    let spot = state.surfer.spot(&id).await?;
    Ok(ApiResponse::success(spot))
}
