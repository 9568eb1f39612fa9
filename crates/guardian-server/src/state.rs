//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use geo_locator::GeoClient;
use report_validator::ReportValidator;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Report validator (LLM-backed in production).
    pub validator: Arc<dyn ReportValidator>,
    /// Location client.
    pub geo: GeoClient,
    /// Server configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        validator: Arc<dyn ReportValidator>,
        geo: GeoClient,
        config: Config,
    ) -> Self {
        Self {
            db,
            validator,
            geo,
            config: Arc::new(config),
        }
    }
}
