// src/state.rs

use axum::extract::FromRef;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::config::Config;
use crate::generator::ChatClient;
use crate::models::question::QuestionRecord;

/// Explicit cache of assembled pools, keyed by date. Populated on the
/// first request for a date; invalidated only by an explicit regenerate.
pub type PoolCache = Arc<Mutex<HashMap<NaiveDate, Vec<QuestionRecord>>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub chat: Arc<dyn ChatClient>,
    pub pools: PoolCache,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: Config,
        clock: Arc<dyn Clock>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            pool,
            config,
            clock,
            chat,
            pools: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
