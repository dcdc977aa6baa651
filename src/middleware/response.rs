use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Paging window echoed back with list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub limit: i64,
    pub offset: i64,
    pub count: usize,
}

/// Success envelope: `{ "success": true, "data": ..., "meta"?: ... }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
            meta: None,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl ApiResponse<()> {
    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            ..Self::success(())
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        if self.status_code == StatusCode::NO_CONTENT {
            return self.status_code.into_response();
        }

        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "code": "INTERNAL_SERVER_ERROR",
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "data": data
        });
        if let Some(meta) = self.meta {
            envelope["meta"] = json!(meta);
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
