//! The persistence seam.
//!
//! Everything the conversation flow, the calendar integration and the
//! background workers need from the database goes through
//! [`ConversationStore`], so those components receive an explicit handle
//! instead of reaching for a connection themselves. [`PgStore`] is the
//! production implementation over the query modules; the integration tests
//! substitute an in-memory store.

use crate::database::DbPool;
use crate::error::{Error, Result};
use crate::models::{
    appointments::{Appointment, AppointmentStatus, NewAppointment},
    conversations::{ConversationMessage, NewConversationMessage},
    followups::{Followup, NewFollowup},
    leads::{Lead, LeadStage, LeadUpdate, NewLead},
    metrics::DailyMetric,
    properties::{Property, UnitFilters, UnitListing},
};
use crate::queries;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Cheap reachability probe for the health endpoint.
    async fn ping(&self) -> Result<()>;

    // Leads
    async fn lead_by_phone(&self, phone_number: &str) -> Result<Option<Lead>>;
    async fn lead_by_id(&self, id: Uuid) -> Result<Option<Lead>>;
    async fn lead_by_email(&self, email: &str) -> Result<Option<Lead>>;
    async fn create_lead(&self, new_lead: NewLead) -> Result<Lead>;
    async fn update_lead(&self, id: Uuid, update: &LeadUpdate) -> Result<Lead>;
    async fn touch_lead(&self, id: Uuid) -> Result<()>;
    async fn stale_leads(&self, stage: LeadStage, cutoff: DateTime<Utc>) -> Result<Vec<Lead>>;
    async fn recent_leads_by_stage(
        &self,
        stage: LeadStage,
        since: DateTime<Utc>,
    ) -> Result<Vec<Lead>>;
    async fn count_leads_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stage: Option<LeadStage>,
    ) -> Result<i64>;

    // Conversation log
    async fn log_message(&self, message: NewConversationMessage) -> Result<ConversationMessage>;
    async fn history(&self, lead_id: Uuid, limit: i64) -> Result<Vec<ConversationMessage>>;

    // Inventory
    async fn list_properties(&self) -> Result<Vec<Property>>;
    async fn available_units(&self, filters: &UnitFilters) -> Result<Vec<UnitListing>>;

    // Appointments
    async fn create_appointment(&self, new_appointment: NewAppointment) -> Result<Appointment>;
    async fn appointment_by_event_id(&self, external_event_id: &str)
    -> Result<Option<Appointment>>;
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment>;
    async fn count_appointments_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<AppointmentStatus>,
    ) -> Result<i64>;
    async fn count_appointments_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;

    // Followups
    async fn create_followup(&self, new_followup: NewFollowup) -> Result<Followup>;
    async fn due_followups(&self, now: DateTime<Utc>) -> Result<Vec<Followup>>;
    async fn mark_followup_sent(&self, id: Uuid) -> Result<()>;
    async fn cancel_pending_followups(&self, lead_id: Uuid) -> Result<u64>;

    // Metrics
    async fn upsert_daily_metric(&self, metric: &DailyMetric) -> Result<()>;
    async fn daily_metrics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetric>>;
}

/// PostgreSQL-backed store over the connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(Error::Sqlx)
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        sqlx::query("SELECT 1")
            .execute(conn.as_mut())
            .await
            .map_err(Error::Sqlx)?;
        Ok(())
    }

    async fn lead_by_phone(&self, phone_number: &str) -> Result<Option<Lead>> {
        let mut conn = self.conn().await?;
        queries::leads::get_lead_by_phone(conn.as_mut(), phone_number).await
    }

    async fn lead_by_id(&self, id: Uuid) -> Result<Option<Lead>> {
        let mut conn = self.conn().await?;
        queries::leads::get_lead_by_id(conn.as_mut(), id).await
    }

    async fn lead_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let mut conn = self.conn().await?;
        queries::leads::get_lead_by_email(conn.as_mut(), email).await
    }

    async fn create_lead(&self, new_lead: NewLead) -> Result<Lead> {
        let mut conn = self.conn().await?;
        queries::leads::create_lead(conn.as_mut(), new_lead).await
    }

    async fn update_lead(&self, id: Uuid, update: &LeadUpdate) -> Result<Lead> {
        let mut conn = self.conn().await?;
        queries::leads::update_lead(conn.as_mut(), id, update).await
    }

    async fn touch_lead(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn().await?;
        queries::leads::touch_lead(conn.as_mut(), id).await
    }

    async fn stale_leads(&self, stage: LeadStage, cutoff: DateTime<Utc>) -> Result<Vec<Lead>> {
        let mut conn = self.conn().await?;
        queries::leads::get_stale_leads(conn.as_mut(), stage, cutoff).await
    }

    async fn recent_leads_by_stage(
        &self,
        stage: LeadStage,
        since: DateTime<Utc>,
    ) -> Result<Vec<Lead>> {
        let mut conn = self.conn().await?;
        queries::leads::get_recent_leads_by_stage(conn.as_mut(), stage, since).await
    }

    async fn count_leads_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stage: Option<LeadStage>,
    ) -> Result<i64> {
        let mut conn = self.conn().await?;
        queries::leads::count_leads_created_between(conn.as_mut(), start, end, stage).await
    }

    async fn log_message(&self, message: NewConversationMessage) -> Result<ConversationMessage> {
        let mut conn = self.conn().await?;
        queries::conversations::log_message(conn.as_mut(), message).await
    }

    async fn history(&self, lead_id: Uuid, limit: i64) -> Result<Vec<ConversationMessage>> {
        let mut conn = self.conn().await?;
        queries::conversations::get_history(conn.as_mut(), lead_id, limit).await
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        let mut conn = self.conn().await?;
        queries::properties::list_properties(conn.as_mut()).await
    }

    async fn available_units(&self, filters: &UnitFilters) -> Result<Vec<UnitListing>> {
        let mut conn = self.conn().await?;
        queries::properties::get_available_units(conn.as_mut(), filters).await
    }

    async fn create_appointment(&self, new_appointment: NewAppointment) -> Result<Appointment> {
        let mut conn = self.conn().await?;
        queries::appointments::create_appointment(conn.as_mut(), new_appointment).await
    }

    async fn appointment_by_event_id(
        &self,
        external_event_id: &str,
    ) -> Result<Option<Appointment>> {
        let mut conn = self.conn().await?;
        queries::appointments::get_by_external_event_id(conn.as_mut(), external_event_id).await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut conn = self.conn().await?;
        queries::appointments::update_status(conn.as_mut(), id, status).await
    }

    async fn count_appointments_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<AppointmentStatus>,
    ) -> Result<i64> {
        let mut conn = self.conn().await?;
        queries::appointments::count_created_between(conn.as_mut(), start, end, status).await
    }

    async fn count_appointments_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = self.conn().await?;
        queries::appointments::count_completed_between(conn.as_mut(), start, end).await
    }

    async fn create_followup(&self, new_followup: NewFollowup) -> Result<Followup> {
        let mut conn = self.conn().await?;
        queries::followups::create_followup(conn.as_mut(), new_followup).await
    }

    async fn due_followups(&self, now: DateTime<Utc>) -> Result<Vec<Followup>> {
        let mut conn = self.conn().await?;
        queries::followups::get_due_followups(conn.as_mut(), now).await
    }

    async fn mark_followup_sent(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn().await?;
        queries::followups::mark_sent(conn.as_mut(), id).await
    }

    async fn cancel_pending_followups(&self, lead_id: Uuid) -> Result<u64> {
        let mut conn = self.conn().await?;
        queries::followups::cancel_pending_for_lead(conn.as_mut(), lead_id).await
    }

    async fn upsert_daily_metric(&self, metric: &DailyMetric) -> Result<()> {
        let mut conn = self.conn().await?;
        queries::metrics::upsert_daily_metric(conn.as_mut(), metric).await
    }

    async fn daily_metrics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetric>> {
        let mut conn = self.conn().await?;
        queries::metrics::get_between(conn.as_mut(), start, end).await
    }
}
