// Route exports
pub mod banks;
pub mod dashboard;
pub mod exchanges;
pub mod query;
pub mod upload;

use crate::config::UploadSettings;
use crate::services::Console;
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub console: Arc<Console>,
    pub upload: UploadSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(dashboard::configure)
            .configure(query::configure)
            .configure(banks::configure)
            .configure(exchanges::configure),
    );
}
