//! Success half of the response envelope

use axum::Json;
use serde::{Deserialize, Serialize};

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete
    pub fn empty() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, crate::api::ApiError>;
