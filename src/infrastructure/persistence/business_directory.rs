//! PostgreSQL implementation of the business context provider

use crate::domain::business::{
    AiConfiguration, Business, BusinessContext, BusinessContextProvider, PhoneNumber,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{BusinessId, PhoneNumberId};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(FromRow)]
struct NumberRow {
    phone_number_id: Uuid,
    number: String,
    business_id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
}

#[derive(FromRow)]
struct BusinessRow {
    business_id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
}

#[derive(FromRow)]
struct AiConfigRow {
    api_key: String,
    custom_instructions: Option<String>,
    is_active: bool,
}

pub struct PgBusinessDirectory {
    pool: PgPool,
}

impl PgBusinessDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn active_ai_config(&self, business_id: Uuid) -> Result<Option<AiConfiguration>> {
        let row = sqlx::query_as::<_, AiConfigRow>(
            r#"
            SELECT api_key, custom_instructions, is_active
            FROM ai_configurations
            WHERE business_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(row.map(|r| AiConfiguration {
            api_key: r.api_key,
            custom_instructions: r.custom_instructions,
            is_active: r.is_active,
        }))
    }
}

#[async_trait]
impl BusinessContextProvider for PgBusinessDirectory {
    async fn resolve_number(
        &self,
        called_number: &str,
    ) -> Result<Option<(PhoneNumber, BusinessContext)>> {
        let row = sqlx::query_as::<_, NumberRow>(
            r#"
            SELECT pn.id AS phone_number_id, pn.number, b.id AS business_id,
                   b.name, b.description, b.is_active
            FROM phone_numbers pn
            JOIN businesses b ON b.id = pn.business_id
            WHERE pn.number = $1
            "#,
        )
        .bind(called_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let ai_config = self.active_ai_config(row.business_id).await?;

        Ok(Some((
            PhoneNumber {
                id: PhoneNumberId::from_uuid(row.phone_number_id),
                number: row.number,
                business_id: BusinessId::from_uuid(row.business_id),
            },
            BusinessContext {
                business: Business {
                    id: BusinessId::from_uuid(row.business_id),
                    name: row.name,
                    description: row.description,
                    is_active: row.is_active,
                },
                ai_config,
            },
        )))
    }

    async fn resolve_business(&self, id: &BusinessId) -> Result<Option<BusinessContext>> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id AS business_id, name, description, is_active
            FROM businesses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let ai_config = self.active_ai_config(row.business_id).await?;

        Ok(Some(BusinessContext {
            business: Business {
                id: BusinessId::from_uuid(row.business_id),
                name: row.name,
                description: row.description,
                is_active: row.is_active,
            },
            ai_config,
        }))
    }
}
