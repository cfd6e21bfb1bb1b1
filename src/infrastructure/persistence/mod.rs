//! Persistence adapters
//!
//! PostgreSQL adapters are compiled with the `postgres` feature; in-memory
//! adapters are always available and back the test suite and the `memory`
//! runtime mode.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod business_directory;
#[cfg(feature = "postgres")]
pub mod call_repository;
#[cfg(feature = "postgres")]
pub mod database;

pub use memory::{InMemoryBusinessDirectory, InMemoryCallRepository};

#[cfg(feature = "postgres")]
pub use business_directory::PgBusinessDirectory;
#[cfg(feature = "postgres")]
pub use call_repository::PgCallRepository;
#[cfg(feature = "postgres")]
pub use database::{create_pool, run_migrations};
