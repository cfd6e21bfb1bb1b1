//! Business context provider interface

use super::{AiConfiguration, Business, PhoneNumber};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::BusinessId;
use async_trait::async_trait;

/// Everything the router needs to know about the owner of a number
#[derive(Debug, Clone)]
pub struct BusinessContext {
    pub business: Business,
    /// Active AI configuration, if the business has one
    pub ai_config: Option<AiConfiguration>,
}

/// Port for resolving called numbers to their owning business
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessContextProvider: Send + Sync {
    /// Resolve a called number to its phone-number record and business
    /// context. `None` means the number is not provisioned here.
    async fn resolve_number(
        &self,
        called_number: &str,
    ) -> Result<Option<(PhoneNumber, BusinessContext)>>;

    /// Resolve a business directly, for mid-call operations that already
    /// hold a call record
    async fn resolve_business(&self, id: &BusinessId) -> Result<Option<BusinessContext>>;
}
