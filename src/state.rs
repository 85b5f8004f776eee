use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::services::{AuthService, FolderService, HistoryService, PlanService, ProjectService, SearchService};

/// Shared by every handler. Cloning is cheap: the pool and the rest are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenService::from_config(&config.security)),
            config: Arc::new(config),
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.pool.clone(), self.tokens.clone(), self.config.roles.clone())
    }

    pub fn folders(&self) -> FolderService {
        FolderService::new(self.pool.clone())
    }

    pub fn plans(&self) -> PlanService {
        PlanService::new(self.pool.clone())
    }

    pub fn projects(&self) -> ProjectService {
        ProjectService::new(self.pool.clone())
    }

    pub fn search(&self) -> SearchService {
        SearchService::new(self.pool.clone())
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.pool.clone(), self.config.history.clone())
    }
}
