use sea_orm::Database;
use tracing::info;

use medgate_core::clock::SystemClock;
use medgate_core::config::Config;
use medgate_core::tracing::init_tracing;

use medgate_records::config::RecordsConfig;
use medgate_records::infra::storage::LocalStorage;
use medgate_records::router::build_router;
use medgate_records::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = RecordsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let storage = LocalStorage::new(&config.upload_dir)
        .await
        .expect("failed to prepare upload directory");

    let state = AppState {
        db,
        storage,
        clock: SystemClock,
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.records_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("records service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
