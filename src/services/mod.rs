//! Application services layer - Use cases and business logic.
//!
//! Services depend on the `UserRepository` trait rather than on sea-orm, so
//! they can be driven by mocks or in-memory stores in tests.

mod auth_service;
pub mod container;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AccessToken, AuthService, Authenticator, Claims, TokenIssuer, TokenPair};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
