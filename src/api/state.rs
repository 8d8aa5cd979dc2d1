//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, Database};
use crate::services::{AuthService, ServiceContainer, Services, UserService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
    /// Redis cache; `None` disables caching and rate limiting
    pub cache: Option<Arc<dyn CacheStore>>,
}

impl AppState {
    /// Create application state backed by the database's user store.
    pub fn from_config(
        database: Arc<Database>,
        cache: Option<Arc<dyn CacheStore>>,
        config: Config,
    ) -> Self {
        let services = Services::from_connection(database.get_connection(), config);
        Self::from_services(&services, database, cache)
    }

    /// Create application state from any service container.
    pub fn from_services(
        services: &dyn ServiceContainer,
        database: Arc<Database>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self::new(services.auth(), services.users(), database, cache)
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
            cache,
        }
    }
}

/// State over a mocked repository and an unused mock database.
#[cfg(test)]
pub(crate) fn test_state(
    repo: crate::infra::MockUserRepository,
    cache: Option<Arc<dyn CacheStore>>,
) -> AppState {
    use sea_orm::{DatabaseBackend, MockDatabase};

    let config = Config::new(
        "postgres://localhost/test",
        crate::config::DEV_JWT_SECRET,
    )
    .unwrap();
    let services = Services::from_repository(Arc::new(repo), config);
    let database = Arc::new(Database::from_connection(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));
    AppState::from_services(&services, database, cache)
}
