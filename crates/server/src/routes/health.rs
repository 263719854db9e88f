use axum::response::Json as ResponseJson;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

#[derive(Debug, Serialize, TS)]
pub struct HealthStatus {
    pub status: &'static str,
    #[ts(type = "Date")]
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

pub async fn health_check() -> ResponseJson<ApiResponse<HealthStatus>> {
    ResponseJson(ApiResponse::success(HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
        version: utils::APP_VERSION,
    }))
}
