use super::config::Config;
use anyhow::Result;
use contracts::dashboards::d401_station_view::ProductionWindow;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared by every handler through axum's `State`
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub window: ProductionWindow,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self> {
        let window = config.production.window()?;
        Ok(Self {
            db,
            config: Arc::new(config),
            window,
        })
    }

    pub fn stations(&self) -> &[String] {
        &self.config.production.stations
    }
}
