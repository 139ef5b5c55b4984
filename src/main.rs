use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use hma_console::config::{LoggingSettings, Settings};
use hma_console::error::{handle_json_payload_error, handle_query_payload_error};
use hma_console::routes::{self, AppState};
use hma_console::{Console, HmaClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    init_tracing(&settings.logging);
    info!("Starting HMA console...");

    let hma = HmaClient::new(&settings.upstream.base_url, settings.upstream.timeout())
        .map_err(|e| {
            error!("Failed to create HMA client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;

    info!(
        "HMA client initialized for {} (timeout: {:?})",
        hma.base_url(),
        settings.upstream.timeout()
    );

    let app_state = AppState {
        console: Arc::new(Console::new(hma, settings.dashboard.clone())),
        upload: settings.upload,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
