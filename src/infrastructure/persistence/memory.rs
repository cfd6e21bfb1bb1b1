//! In-memory adapters for tests and database-less deployments

use crate::domain::business::{
    AiConfiguration, Business, BusinessContext, BusinessContextProvider, PhoneNumber,
};
use crate::domain::call::{Call, CallRepository};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{BusinessId, ProviderCallId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Call repository backed by a map keyed on provider call id
#[derive(Default)]
pub struct InMemoryCallRepository {
    calls: RwLock<HashMap<String, Call>>,
}

impl InMemoryCallRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored calls
    pub async fn len(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.calls.read().await.is_empty()
    }
}

#[async_trait]
impl CallRepository for InMemoryCallRepository {
    async fn create(&self, call: &Call) -> Result<()> {
        let mut calls = self.calls.write().await;
        let key = call.provider_call_id().as_str().to_string();
        if calls.contains_key(&key) {
            return Err(DomainError::AlreadyExists(key));
        }
        calls.insert(key, call.clone());
        Ok(())
    }

    async fn find_by_provider_id(&self, id: &ProviderCallId) -> Result<Option<Call>> {
        Ok(self.calls.read().await.get(id.as_str()).cloned())
    }

    async fn update(&self, call: &Call) -> Result<()> {
        let mut calls = self.calls.write().await;
        let key = call.provider_call_id().as_str().to_string();
        if !calls.contains_key(&key) {
            return Err(DomainError::NotFound(key));
        }
        calls.insert(key, call.clone());
        Ok(())
    }
}

/// Business directory backed by maps built at startup
#[derive(Default)]
pub struct InMemoryBusinessDirectory {
    by_number: HashMap<String, (PhoneNumber, BusinessContext)>,
    by_business: HashMap<BusinessId, BusinessContext>,
}

impl InMemoryBusinessDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a business with its inbound number and optional AI config
    pub fn register(
        &mut self,
        business: Business,
        number: PhoneNumber,
        ai_config: Option<AiConfiguration>,
    ) {
        let context = BusinessContext {
            business: business.clone(),
            ai_config,
        };
        self.by_business.insert(business.id, context.clone());
        self.by_number.insert(number.number.clone(), (number, context));
    }
}

#[async_trait]
impl BusinessContextProvider for InMemoryBusinessDirectory {
    async fn resolve_number(
        &self,
        called_number: &str,
    ) -> Result<Option<(PhoneNumber, BusinessContext)>> {
        Ok(self.by_number.get(called_number).cloned())
    }

    async fn resolve_business(&self, id: &BusinessId) -> Result<Option<BusinessContext>> {
        Ok(self.by_business.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::CallType;
    use crate::domain::shared::value_objects::PhoneNumberId;

    fn call(provider_id: &str) -> Call {
        Call::new(
            ProviderCallId::new(provider_id),
            BusinessId::new(),
            PhoneNumberId::new(),
            "+15550001111".to_string(),
            CallType::Ai,
        )
    }

    #[test]
    fn test_create_then_find_round_trip() {
        tokio_test::block_on(async {
            let repo = InMemoryCallRepository::new();
            repo.create(&call("CA1")).await.unwrap();

            let found = repo
                .find_by_provider_id(&ProviderCallId::new("CA1"))
                .await
                .unwrap();
            assert!(found.is_some());
            assert!(repo
                .find_by_provider_id(&ProviderCallId::new("CA2"))
                .await
                .unwrap()
                .is_none());
        });
    }

    #[test]
    fn test_duplicate_create_is_rejected() {
        tokio_test::block_on(async {
            let repo = InMemoryCallRepository::new();
            repo.create(&call("CA1")).await.unwrap();
            assert!(repo.create(&call("CA1")).await.is_err());
            assert_eq!(repo.len().await, 1);
        });
    }

    #[test]
    fn test_update_requires_existing_call() {
        tokio_test::block_on(async {
            let repo = InMemoryCallRepository::new();
            assert!(repo.update(&call("CA1")).await.is_err());
        });
    }

    #[test]
    fn test_directory_resolves_registered_numbers() {
        tokio_test::block_on(async {
            let business = Business {
                id: BusinessId::new(),
                name: "Rose Cafe".to_string(),
                description: None,
                is_active: true,
            };
            let number = PhoneNumber {
                id: PhoneNumberId::new(),
                number: "+15552223333".to_string(),
                business_id: business.id,
            };

            let mut directory = InMemoryBusinessDirectory::new();
            directory.register(business.clone(), number, None);

            let resolved = directory.resolve_number("+15552223333").await.unwrap();
            assert!(resolved.is_some());
            assert!(directory.resolve_number("+15550000000").await.unwrap().is_none());

            let by_id = directory.resolve_business(&business.id).await.unwrap();
            assert_eq!(by_id.unwrap().business.name, "Rose Cafe");
        });
    }
}
