// src/state.rs
use sqlx::PgPool;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
}

impl AppState {
    pub fn new(db_pool: PgPool, config: Config) -> Self {
        AppState { db_pool, config }
    }
}
