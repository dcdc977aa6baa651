// handlers/mod.rs - Router and shared request types
//
// Public (no auth) → Management (JWT with the admin role)

pub mod protected;
pub mod public;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit,
    },
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::geo::{Bounds, Coordinates};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::services::{ManagementService, SurferService, UserService};
use crate::types::SpotsParams;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub surfer: SurferService,
    pub management: ManagementService,
    pub users: UserService,
}

/// Query string of both spot listings.
#[derive(Debug, Default, Deserialize)]
pub struct SpotsQueryString {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub country_code: Option<String>,
    pub query: Option<String>,
    pub ne_lat: Option<f64>,
    pub ne_lon: Option<f64>,
    pub sw_lat: Option<f64>,
    pub sw_lon: Option<f64>,
}

impl From<SpotsQueryString> for SpotsParams {
    /// A box is only applied when all four corner values are given.
    fn from(q: SpotsQueryString) -> Self {
        let bounds = match (q.ne_lat, q.ne_lon, q.sw_lat, q.sw_lon) {
            (Some(ne_lat), Some(ne_lon), Some(sw_lat), Some(sw_lon)) => Some(Bounds::new(
                Coordinates::new(ne_lat, ne_lon),
                Coordinates::new(sw_lat, sw_lon),
            )),
            _ => None,
        };
        let defaults = SpotsParams::default();
        SpotsParams {
            limit: q.limit.unwrap_or(defaults.limit),
            offset: q.offset.unwrap_or(defaults.offset),
            country_code: q.country_code.unwrap_or_default(),
            search_query: q.query.unwrap_or_default(),
            bounds,
        }
    }
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_json(rejection.body_text())
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Management
        .merge(management_routes())
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config::config().api.max_request_size_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    use public::{auth, spots};

    Router::new()
        .route("/spots", get(spots::spots_get))
        .route("/spots/:id", get(spots::spot_get))
        .route("/auth/sign-in", post(auth::sign_in_post))
}

fn management_routes() -> Router<AppState> {
    use protected::management;

    Router::new()
        .route(
            "/management/spots",
            get(management::spots_get).post(management::spots_post),
        )
        .route("/management/spots/import", post(management::spots_import_post))
        .route(
            "/management/spots/:id",
            get(management::spot_get)
                .patch(management::spot_patch)
                .delete(management::spot_delete),
        )
        .route("/management/location", get(management::location_get))
        // Layers run bottom-up: token first, then role
        .route_layer(middleware::from_fn(require_admin_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Surf Spots API",
            "version": version,
            "description": "Surf spot directory with public search and admin management",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "spots": "/spots[/:id] (public)",
                "sign_in": "/auth/sign-in (public - token acquisition)",
                "management": "/management/spots[/:id], /management/spots/import (admin)",
                "location": "/management/location?lat&lon (admin)",
            }
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "code": "SERVICE_UNAVAILABLE",
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
