use crate::core::{check_bank_name, ValidationError};
use crate::error::ConsoleError;
use crate::models::{BankNameRequest, CreateExchangeRequest};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure exchange setup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/exchanges/apis", web::get().to(list_apis))
        .route("/exchanges/api/{api}/form", web::get().to(exchange_form))
        .route("/exchanges/bank-name", web::post().to(check_bank))
        .route("/exchanges", web::post().to(create_exchange));
}

async fn list_apis(state: web::Data<AppState>) -> Result<HttpResponse, ConsoleError> {
    let apis = state.console.exchange_apis().await?;
    Ok(HttpResponse::Ok().json(apis))
}

/// Form fields for an exchange API, built from its upstream schema
///
/// GET /api/v1/exchanges/api/{api}/form
async fn exchange_form(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ConsoleError> {
    let form = state.console.exchange_form(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(form))
}

/// Inline bank-name check; always 200, the verdict is in the body
async fn check_bank(req: web::Json<BankNameRequest>) -> impl Responder {
    HttpResponse::Ok().json(check_bank_name(&req.bank))
}

/// Create an exchange
///
/// POST /api/v1/exchanges
///
/// ```json
/// {
///   "api": "fb_threatexchange",
///   "bank": "TX_BANK",
///   "config": {"privacy_group": 1234},
///   "credentials": {"api_token": "..."}
/// }
/// ```
async fn create_exchange(
    state: web::Data<AppState>,
    req: web::Json<CreateExchangeRequest>,
) -> Result<HttpResponse, ConsoleError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_exchange request: {:?}", errors);
        return Err(ValidationError::MissingExchangeApi.into());
    }

    let created = state.console.create_exchange(&req).await?;
    Ok(HttpResponse::Created().json(created))
}
