//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL connection, migrations and repositories (sea-orm)
//! - Redis cache for rate limiting and user detail caching

pub mod cache;
pub mod db;
pub mod repositories;

pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use repositories::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
