//! Domain layer - Core business entities and logic
//!
//! The user entity, the password value object and the representations the
//! API hands out. Nothing in here touches the database or HTTP.

pub mod password;
pub mod user;

pub use password::Password;
pub use user::{normalize_email, CreateUser, User, UserResponse};
