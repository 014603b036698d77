use std::sync::Arc;

use axum::extract::FromRef;
use genres_auth::token::TokenManager;
use genres_dal::Pool;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, tokens: TokenManager) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                tokens,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.state.tokens
    }
}

/// Validation context of `Garde` extractors, payloads are validated without context
impl FromRef<AppState> for () {
    fn from_ref(_state: &AppState) {}
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    tokens: TokenManager,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
        }
    }
}
