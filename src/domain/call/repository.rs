//! Call repository interface

use crate::domain::call::aggregate::Call;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::ProviderCallId;
use async_trait::async_trait;

/// Repository interface for the Call aggregate
///
/// Defined in the domain layer as a trait (port) and implemented in the
/// infrastructure layer (adapter). Lookups are keyed by the provider call
/// id because every callback from the provider carries it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Persist a newly created call
    async fn create(&self, call: &Call) -> Result<()>;

    /// Find a call by its provider call id
    async fn find_by_provider_id(&self, id: &ProviderCallId) -> Result<Option<Call>>;

    /// Save the current state of an existing call
    async fn update(&self, call: &Call) -> Result<()>;
}
