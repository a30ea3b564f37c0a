//! Shared test utilities
//!
//! - **database**: testcontainers-backed PostgreSQL harness that applies
//!   the workspace schema
//! - **builders**: fluent builders producing valid requests by default

pub mod builders;
pub mod database;

pub use builders::CustomerRequestBuilder;
pub use database::{
    create_isolated_test_database, get_shared_test_database, TestDatabase, TestDatabaseConfig,
};
