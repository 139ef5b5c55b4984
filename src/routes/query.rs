use crate::core::submission::parse_bypass_flag;
use crate::core::{ContentSubmission, QuerySubmission};
use crate::error::ConsoleError;
use crate::models::{QueryHashRequest, QueryUrlRequest};
use crate::routes::upload::read_form;
use crate::routes::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

/// Configure match lookup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/query/file", web::post().to(query_file))
        .route("/query/url", web::post().to(query_url))
        .route("/query/hash", web::post().to(query_hash));
}

/// Match lookup by uploaded file
///
/// POST /api/v1/query/file
///
/// Multipart fields: `file`, `content_type` (`photo`|`video`),
/// `bypass_enabled_ratio` (`true`|`false`).
async fn query_file(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ConsoleError> {
    let mut form = read_form(
        payload,
        &["file", "content_type", "bypass_enabled_ratio"],
        state.upload,
    )
    .await?;
    let content = ContentSubmission::file(form.take_file("file"), form.field("content_type"))?;
    let bypass = parse_bypass_flag(form.field("bypass_enabled_ratio"));

    let view = state
        .console
        .query(&QuerySubmission::new(content, bypass))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Match lookup by URL
///
/// POST /api/v1/query/url
///
/// ```json
/// {"url": "https://...", "content_type": "photo", "bypass_enabled_ratio": false}
/// ```
async fn query_url(
    state: web::Data<AppState>,
    req: web::Json<QueryUrlRequest>,
) -> Result<HttpResponse, ConsoleError> {
    let content = ContentSubmission::url(&req.url, req.content_type.as_deref())?;
    let view = state
        .console
        .query(&QuerySubmission::new(content, req.bypass_enabled_ratio))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn query_hash(
    state: web::Data<AppState>,
    req: web::Json<QueryHashRequest>,
) -> Result<HttpResponse, ConsoleError> {
    let content = ContentSubmission::hash(&req.signal_type, &req.signal_value)?;
    let view = state
        .console
        .query(&QuerySubmission::new(content, req.bypass_enabled_ratio))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}
