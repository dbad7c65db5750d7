use backend::routes::build_router;
use backend::shared::app_state::AppState;
use backend::shared::config::{get_database_path, load_config};
use backend::shared::data::db::initialize_database;
use backend::system;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;
    let db_path = get_database_path(&config);
    tracing::info!(
        "Ingestion mode: {}, keep raw files: {}",
        config.ingestion.mode,
        config.ingestion.keep_raw_files
    );

    let db = initialize_database(&db_path).await?;
    tracing::info!("Database ready at {}", db_path.display());

    let port = config.server.port;
    let state = AppState::new(db, config)?;
    let app = build_router(state);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Port {} is already in use", port);
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
