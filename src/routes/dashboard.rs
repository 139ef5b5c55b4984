use crate::core::{TimeSpan, ValidationError};
use crate::error::ConsoleError;
use crate::models::{DashboardQuery, HealthResponse};
use crate::routes::upload::read_form;
use crate::routes::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};

/// Configure health, dashboard and comparison routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/dashboard", web::get().to(dashboard))
        .route("/compare", web::post().to(compare));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let upstream = state.console.upstream_health().await;
    let status = if upstream == "ok" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream,
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/dashboard?time_span=24h
async fn dashboard(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, ConsoleError> {
    let time_span = TimeSpan::parse_or_default(query.time_span.as_deref())?;
    let view = state.console.dashboard(time_span).await;
    Ok(HttpResponse::Ok().json(view))
}

/// Compare the hashes of two photos
///
/// POST /api/v1/compare, multipart files `left` and `right`
async fn compare(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ConsoleError> {
    let mut form = read_form(payload, &["left", "right"], state.upload).await?;
    let left = form
        .take_file("left")
        .filter(|f| !f.bytes.is_empty())
        .ok_or(ValidationError::MissingComparisonFile("left"))?;
    let right = form
        .take_file("right")
        .filter(|f| !f.bytes.is_empty())
        .ok_or(ValidationError::MissingComparisonFile("right"))?;

    let view = state.console.compare_files(&left, &right).await?;
    Ok(HttpResponse::Ok().json(view))
}
