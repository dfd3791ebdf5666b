//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod reset_token;
pub mod user;

pub use password::Password;
pub use reset_token::ResetToken;
pub use user::{NewUser, ProfileUpdate, User, UserResponse, UserRole};
