//! ROBOT Cleaner API - accounts and authentication for the ROBOT Cleaner storefront.
//!
//! Email/password and Google sign-in, JWT sessions carried in an httpOnly
//! cookie or a bearer header, profile management and password recovery.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, passwords and reset tokens
//! - **services**: Authentication, user and Google login use cases
//! - **infra**: Postgres (sea-orm) and Redis
//! - **jobs**: Queued email delivery (apalis)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! robot-cleaner-api serve --port 5002
//!
//! # Run migrations
//! robot-cleaner-api migrate up
//!
//! # Deliver queued emails
//! robot-cleaner-api jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
