//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Aggregates: Consistency boundaries
//! - Value Objects: Immutable objects without identity
//! - Repository Interfaces: Ports for persistence and lookup
//! - Domain Events: Things that happened in the domain

pub mod business;
pub mod call;
pub mod routing;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
