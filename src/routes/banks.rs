use crate::core::{ContentSubmission, RemovalTarget, ValidationError};
use crate::error::ConsoleError;
use crate::models::{AddHashRequest, AddUrlRequest, RemoveContentRequest};
use crate::routes::upload::read_form;
use crate::routes::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure bank content routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/banks", web::get().to(list_banks))
        .route("/banks/{bank}/content/file", web::post().to(add_file))
        .route("/banks/{bank}/content/url", web::post().to(add_url))
        .route("/banks/{bank}/content/hash", web::post().to(add_hash))
        .route("/banks/{bank}/remove", web::post().to(remove_content));
}

fn bank_param(path: web::Path<String>) -> Result<String, ValidationError> {
    let bank = path.into_inner();
    if bank.trim().is_empty() {
        return Err(ValidationError::MissingBankName);
    }
    Ok(bank)
}

async fn list_banks(state: web::Data<AppState>) -> Result<HttpResponse, ConsoleError> {
    let banks = state.console.list_banks().await?;
    Ok(HttpResponse::Ok().json(banks))
}

/// POST /api/v1/banks/{bank}/content/file
async fn add_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, ConsoleError> {
    let bank = bank_param(path)?;
    let mut form = read_form(payload, &["file", "content_type"], state.upload).await?;
    let content = ContentSubmission::file(form.take_file("file"), form.field("content_type"))?;

    let added = state.console.add_content(&bank, &content).await?;
    Ok(HttpResponse::Ok().json(added))
}

/// POST /api/v1/banks/{bank}/content/url
async fn add_url(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddUrlRequest>,
) -> Result<HttpResponse, ConsoleError> {
    let bank = bank_param(path)?;
    if req.validate().is_err() {
        tracing::info!("Rejected add-by-URL for bank {}: empty url", bank);
        return Err(ValidationError::MissingUrl.into());
    }
    let content = ContentSubmission::url(&req.url, req.content_type.as_deref())?;

    let added = state.console.add_content(&bank, &content).await?;
    Ok(HttpResponse::Ok().json(added))
}

/// POST /api/v1/banks/{bank}/content/hash
async fn add_hash(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddHashRequest>,
) -> Result<HttpResponse, ConsoleError> {
    let bank = bank_param(path)?;
    let content = ContentSubmission::hash(&req.signal_type, &req.signal_value)?;

    let added = state.console.add_content(&bank, &content).await?;
    Ok(HttpResponse::Ok().json(added))
}

/// Remove content by URL, hash or id
///
/// POST /api/v1/banks/{bank}/remove
///
/// ```json
/// {"by": "hash", "signal_type": "pdq", "signal_value": "facd..."}
/// ```
async fn remove_content(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RemoveContentRequest>,
) -> Result<HttpResponse, ConsoleError> {
    let bank = bank_param(path)?;
    let target = RemovalTarget::from_request(&req)?;

    let summary = state.console.remove_content(&bank, &target).await?;
    Ok(HttpResponse::Ok().json(summary))
}
