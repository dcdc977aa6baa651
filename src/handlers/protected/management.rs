// handlers/protected/management.rs - /management/* (admin only)

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Path, Query, State,
};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::geo::{Coordinates, Location};
use crate::handlers::{json_rejection, query_rejection, AppState, SpotsQueryString};
use crate::middleware::response::{ApiResponse, ApiResult, PageMeta};
use crate::middleware::AuthUser;
use crate::types::{CreateSpotParams, Spot, SpotsParams, UpdateSpotParams};

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: u64,
}

/// GET /management/spots - search spots, text also matches ids
pub async fn spots_get(
    State(state): State<AppState>,
    query: Result<Query<SpotsQueryString>, QueryRejection>,
) -> ApiResult<Vec<Spot>> {
    let Query(query) = query.map_err(query_rejection)?;
    let params = SpotsParams::from(query);
    let (limit, offset) = params.page();

    let spots = state.management.spots(params).await?;
    let meta = PageMeta { limit, offset, count: spots.len() };
    Ok(ApiResponse::success(spots).with_meta(meta))
}

/// POST /management/spots
pub async fn spots_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<CreateSpotParams>, JsonRejection>,
) -> ApiResult<Spot> {
    let Json(params) = body.map_err(json_rejection)?;
    let spot = state.management.create_spot(params).await?;
    info!("{} created spot {}", user.email, spot.id);
    Ok(ApiResponse::created(spot))
}

/// POST /management/spots/import - all entries or none
pub async fn spots_import_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Vec<CreateSpotParams>>, JsonRejection>,
) -> ApiResult<ImportSummary> {
    let Json(entries) = body.map_err(json_rejection)?;
    let imported = state.management.import_spots(entries).await?;
    info!("{} imported {} spots", user.email, imported);
    Ok(ApiResponse::created(ImportSummary { imported }))
}

/// GET /management/spots/:id
pub async fn spot_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Spot> {
    let spot = state.management.spot(&id).await?;
    Ok(ApiResponse::success(spot))
}

/// PATCH /management/spots/:id - only the fields present in the body change
pub async fn spot_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSpotParams>, JsonRejection>,
) -> ApiResult<Spot> {
    let Json(params) = body.map_err(json_rejection)?;
    let spot = state
        .management
        .update_spot(UpdateSpotParams { id, ..params })
        .await?;
    Ok(ApiResponse::success(spot))
}

/// DELETE /management/spots/:id
pub async fn spot_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.management.delete_spot(&id).await?;
    info!("{} deleted spot {}", user.email, id.trim());
    Ok(ApiResponse::no_content())
}

/// GET /management/location?lat&lon - reverse geocoding
pub async fn location_get(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> ApiResult<Location> {
    let Query(LocationQuery { lat, lon }) = query.map_err(query_rejection)?;
    let location = state.management.location(Coordinates::new(lat, lon)).await?;
    Ok(ApiResponse::success(location))
}
