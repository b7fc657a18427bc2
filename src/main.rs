use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use diesel_migrations::MigrationHarness;
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use studio_backend::config::Settings;
use studio_backend::db::connection::build_pool;
use studio_backend::db::MIGRATIONS;
use studio_backend::email::LogSender;
use studio_backend::security::rate_limit::{IpRateLimiter, RateLimit};
use studio_backend::{api, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().expect("failed to load settings");

    let pool = build_pool(&settings.database).expect("failed to create database pool");
    {
        let mut conn = pool.get().expect("failed to get database connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
    }
    tracing::info!("database ready, migrations applied");

    let limiter = Arc::new(IpRateLimiter::new(
        settings.security.rate_limit_per_second,
        settings.security.rate_limit_burst,
        settings.security.max_tracked_clients,
    ));

    let state = web::Data::new(AppState {
        pool,
        sender: Arc::new(LogSender::new(&settings.email)),
        admin_token: settings.security.admin_token.clone(),
    });

    let bind_address = (settings.server.host.clone(), settings.server.port);
    tracing::info!(host = %settings.server.host, port = settings.server.port, "starting server");

    let cors_settings = settings.cors.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in cors_settings.origins() {
            cors = cors.allowed_origin(&origin);
        }

        App::new()
            .wrap(cors)
            .wrap(RateLimit(limiter.clone()))
            .app_data(state.clone())
            .app_data(api::json_config())
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
