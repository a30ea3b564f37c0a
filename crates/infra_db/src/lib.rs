//! Database Infrastructure Layer
//!
//! PostgreSQL persistence for the customer system using SQLx:
//!
//! - **Pool**: connection pool configuration and creation
//! - **Repositories**: the customer aggregate builder/query service and
//!   the country/city reference-data resolver
//! - **Error Mapping**: PostgreSQL error codes translated into domain
//!   error kinds (a unique violation is a conflict, never a generic
//!   failure)
//!
//! `CustomerRepository` implements `domain_customer::CustomerStore`, so
//! the bulk transfer engine runs against it unchanged.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::CustomerRepository;
