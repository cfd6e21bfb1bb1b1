//! PostgreSQL implementation of the Call repository

use crate::domain::call::{Call, CallRepository, CallStatus, CallType};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{BusinessId, CallId, PhoneNumberId, ProviderCallId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

#[derive(FromRow)]
struct CallRow {
    id: Uuid,
    provider_call_id: String,
    business_id: Uuid,
    phone_number_id: Uuid,
    caller_number: String,
    call_type: String,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_seconds: Option<i32>,
    call_summary: Option<String>,
    recording_url: Option<String>,
    recording_sid: Option<String>,
    cost: Option<f64>,
}

impl From<CallRow> for Call {
    fn from(r: CallRow) -> Self {
        Call::restore(
            CallId::from_uuid(r.id),
            ProviderCallId::new(r.provider_call_id),
            BusinessId::from_uuid(r.business_id),
            PhoneNumberId::from_uuid(r.phone_number_id),
            r.caller_number,
            CallType::from_str(&r.call_type).unwrap_or(CallType::Ai),
            CallStatus::from_str(&r.status).unwrap_or(CallStatus::Failed),
            r.started_at,
            r.ended_at,
            r.duration_seconds,
            r.call_summary,
            r.recording_url,
            r.recording_sid,
            r.cost,
        )
    }
}

pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallRepository for PgCallRepository {
    async fn create(&self, call: &Call) -> Result<()> {
        debug!(provider_call_id = %call.provider_call_id(), "Creating call record");

        sqlx::query(
            r#"
            INSERT INTO calls (
                id, provider_call_id, business_id, phone_number_id,
                caller_number, call_type, status,
                started_at, ended_at, duration_seconds,
                call_summary, recording_url, recording_sid, cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(call.id().as_uuid())
        .bind(call.provider_call_id().as_str())
        .bind(call.business_id().as_uuid())
        .bind(call.phone_number_id().as_uuid())
        .bind(call.caller_number())
        .bind(call.call_type().as_str())
        .bind(call.status().as_str())
        .bind(*call.started_at())
        .bind(call.ended_at().copied())
        .bind(call.duration_seconds())
        .bind(call.summary())
        .bind(call.recording_url())
        .bind(call.recording_sid())
        .bind(call.cost())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn find_by_provider_id(&self, id: &ProviderCallId) -> Result<Option<Call>> {
        let row = sqlx::query_as::<_, CallRow>(
            r#"
            SELECT id, provider_call_id, business_id, phone_number_id,
                   caller_number, call_type, status,
                   started_at, ended_at, duration_seconds,
                   call_summary, recording_url, recording_sid, cost
            FROM calls
            WHERE provider_call_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(row.map(Call::from))
    }

    async fn update(&self, call: &Call) -> Result<()> {
        debug!(provider_call_id = %call.provider_call_id(), status = call.status().as_str(), "Updating call record");

        sqlx::query(
            r#"
            UPDATE calls
            SET call_type = $2,
                status = $3,
                ended_at = $4,
                duration_seconds = $5,
                call_summary = $6,
                recording_url = $7,
                recording_sid = $8,
                cost = $9,
                updated_at = now()
            WHERE provider_call_id = $1
            "#,
        )
        .bind(call.provider_call_id().as_str())
        .bind(call.call_type().as_str())
        .bind(call.status().as_str())
        .bind(call.ended_at().copied())
        .bind(call.duration_seconds())
        .bind(call.summary())
        .bind(call.recording_url())
        .bind(call.recording_sid())
        .bind(call.cost())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(())
    }
}
