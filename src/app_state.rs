use sqlx::PgPool;
use std::sync::Arc;

use crate::services::valuation::ValuationClient;

/// Shared application state passed to all route handlers.
///
/// The valuation client is a trait object so tests can swap in a stub and
/// drive the fallback path deterministically.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub valuer: Arc<dyn ValuationClient>,
}

impl AppState {
    pub fn new(db: PgPool, valuer: Arc<dyn ValuationClient>) -> Self {
        Self { db, valuer }
    }
}
