use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};

use attendance_api::config::Config;
use attendance_api::db::init_store;
use attendance_api::docs::ApiDoc;
use attendance_api::service::{AnalyticsService, AttendanceService};
use attendance_api::{api, routes};
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {:#}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, backend = ?config.store_backend, "Server starting...");

    let store = init_store(&config).await.map_err(|e| {
        error!(error = %format!("{:#}", e), "Failed to initialize store");
        std::io::Error::other(e.to_string())
    })?;

    let attendance = Data::new(AttendanceService::new(store.clone(), config.store_timeout));
    let analytics = Data::new(AnalyticsService::new(store.clone(), &config));
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(attendance.clone())
            .app_data(analytics.clone())
            .route("/", web::get().to(api::health))
            .configure(|cfg| routes::configure(cfg, &config_data))
            .default_service(web::route().to(api::not_found))
    })
    .bind(server_addr)?
    .run()
    .await;

    info!("Server stopped, closing store");
    store.close().await;

    result
}
