//! Service container - wires services onto a shared repository.

use std::sync::Arc;

use super::{AuthService, Authenticator, UserManager, UserService};
use crate::config::Config;
use crate::infra::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Build every service on top of one user repository.
    pub fn from_repository(repo: Arc<dyn UserRepository>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(repo.clone(), config)),
            user_service: Arc::new(UserManager::new(repo)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::from_repository(Arc::new(UserStore::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
