//! Health check endpoint.

use actix_web::{HttpResponse, web};
use yatube_shared::HealthResponse;

use crate::state::AppState;

/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.store.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
