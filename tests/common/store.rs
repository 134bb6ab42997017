//! In-memory [`ConversationStore`] used by the integration suite.
//!
//! Mirrors the semantics the PostgreSQL implementation gets from SQL:
//! partial updates leave absent fields untouched, history is capped to the
//! most recent N in ascending order, cancellation only hits pending rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use leasebot::error::{Error, Result};
use leasebot::models::{
    appointments::{Appointment, AppointmentStatus, NewAppointment},
    conversations::{ConversationMessage, NewConversationMessage},
    followups::{Followup, FollowupStatus, NewFollowup},
    leads::{Lead, LeadStage, LeadUpdate, NewLead},
    metrics::DailyMetric,
    properties::{Property, UnitFilters, UnitListing},
};
use leasebot::store::ConversationStore;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    leads: Vec<Lead>,
    messages: Vec<ConversationMessage>,
    properties: Vec<Property>,
    units: Vec<UnitListing>,
    appointments: Vec<Appointment>,
    followups: Vec<Followup>,
    metrics: Vec<DailyMetric>,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_lead(&self, lead: Lead) {
        self.inner.lock().unwrap().leads.push(lead);
    }

    pub fn insert_followup(&self, followup: Followup) {
        self.inner.lock().unwrap().followups.push(followup);
    }

    pub fn add_property(&self, name: &str, address: &str) -> Property {
        let property = Property {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: address.to_string(),
        };
        self.inner.lock().unwrap().properties.push(property.clone());
        property
    }

    pub fn add_unit(&self, property: &Property, rooms: i32, price: i64, image_url: Option<&str>) {
        let unit = UnitListing {
            unit_id: Uuid::new_v4(),
            rooms,
            price,
            has_parking: false,
            area_sqm: Some(70),
            image_url: image_url.map(str::to_string),
            floorplan_url: None,
            property_name: property.name.clone(),
            property_address: property.address.clone(),
        };
        self.inner.lock().unwrap().units.push(unit);
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.inner.lock().unwrap().leads.clone()
    }

    pub fn messages_for(&self, lead_id: Uuid) -> Vec<ConversationMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.lead_id == lead_id)
            .cloned()
            .collect()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.inner.lock().unwrap().appointments.clone()
    }

    pub fn followups(&self) -> Vec<Followup> {
        self.inner.lock().unwrap().followups.clone()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn lead_by_phone(&self, phone_number: &str) -> Result<Option<Lead>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .leads
            .iter()
            .find(|l| l.phone_number == phone_number)
            .cloned())
    }

    async fn lead_by_id(&self, id: Uuid) -> Result<Option<Lead>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .leads
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn lead_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let inner = self.inner.lock().unwrap();
        let mut matches: Vec<&Lead> = inner
            .leads
            .iter()
            .filter(|l| l.email.as_deref() == Some(email))
            .collect();
        matches.sort_by_key(|l| std::cmp::Reverse(l.last_interaction));
        Ok(matches.first().map(|l| (*l).clone()))
    }

    async fn create_lead(&self, new_lead: NewLead) -> Result<Lead> {
        let lead = Lead {
            id: Uuid::new_v4(),
            phone_number: new_lead.phone_number,
            name: new_lead.name,
            email: None,
            stage: LeadStage::New,
            preferred_area: None,
            rooms: None,
            budget: None,
            has_parking: None,
            has_payslips: None,
            can_pay_deposit: None,
            move_in_date: None,
            last_interaction: Utc::now(),
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().leads.push(lead.clone());
        Ok(lead)
    }

    async fn update_lead(&self, id: Uuid, update: &LeadUpdate) -> Result<Lead> {
        let mut inner = self.inner.lock().unwrap();
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("Lead with ID {} not found", id)))?;

        if let Some(name) = &update.name {
            lead.name = Some(name.clone());
        }
        if let Some(email) = &update.email {
            lead.email = Some(email.clone());
        }
        if let Some(stage) = update.stage {
            lead.stage = stage;
        }
        if let Some(area) = &update.preferred_area {
            lead.preferred_area = Some(area.clone());
        }
        if let Some(rooms) = update.rooms {
            lead.rooms = Some(rooms);
        }
        if let Some(budget) = update.budget {
            lead.budget = Some(budget);
        }
        if let Some(parking) = update.has_parking {
            lead.has_parking = Some(parking);
        }
        if let Some(payslips) = update.has_payslips {
            lead.has_payslips = Some(payslips);
        }
        if let Some(deposit) = update.can_pay_deposit {
            lead.can_pay_deposit = Some(deposit);
        }
        if let Some(move_in) = update.move_in_date {
            lead.move_in_date = Some(move_in);
        }
        lead.last_interaction = Utc::now();
        Ok(lead.clone())
    }

    async fn touch_lead(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("Lead with ID {} not found", id)))?;
        lead.last_interaction = Utc::now();
        Ok(())
    }

    async fn stale_leads(&self, stage: LeadStage, cutoff: DateTime<Utc>) -> Result<Vec<Lead>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .leads
            .iter()
            .filter(|l| l.stage == stage && l.last_interaction < cutoff)
            .cloned()
            .collect())
    }

    async fn recent_leads_by_stage(
        &self,
        stage: LeadStage,
        since: DateTime<Utc>,
    ) -> Result<Vec<Lead>> {
        let inner = self.inner.lock().unwrap();
        let mut matches: Vec<Lead> = inner
            .leads
            .iter()
            .filter(|l| l.stage == stage && l.last_interaction >= since)
            .cloned()
            .collect();
        matches.sort_by_key(|l| std::cmp::Reverse(l.last_interaction));
        Ok(matches)
    }

    async fn count_leads_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stage: Option<LeadStage>,
    ) -> Result<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .leads
            .iter()
            .filter(|l| l.created_at >= start && l.created_at <= end)
            .filter(|l| stage.is_none_or(|s| l.stage == s))
            .count() as i64)
    }

    async fn log_message(&self, message: NewConversationMessage) -> Result<ConversationMessage> {
        let logged = ConversationMessage {
            id: Uuid::new_v4(),
            lead_id: message.lead_id,
            direction: message.direction,
            content: message.content,
            external_id: message.external_id,
            sent_at: Utc::now(),
        };
        self.inner.lock().unwrap().messages.push(logged.clone());
        Ok(logged)
    }

    async fn history(&self, lead_id: Uuid, limit: i64) -> Result<Vec<ConversationMessage>> {
        let inner = self.inner.lock().unwrap();
        let mut history: Vec<ConversationMessage> = inner
            .messages
            .iter()
            .filter(|m| m.lead_id == lead_id)
            .cloned()
            .collect();
        let skip = history.len().saturating_sub(limit as usize);
        history.drain(..skip);
        Ok(history)
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self.inner.lock().unwrap().properties.clone())
    }

    async fn available_units(&self, filters: &UnitFilters) -> Result<Vec<UnitListing>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .units
            .iter()
            .filter(|u| filters.min_rooms.is_none_or(|min| u.rooms >= min))
            .filter(|u| filters.max_rooms.is_none_or(|max| u.rooms <= max))
            .filter(|u| filters.min_price.is_none_or(|min| u.price >= min))
            .filter(|u| filters.max_price.is_none_or(|max| u.price <= max))
            .filter(|u| filters.parking.is_none_or(|p| u.has_parking == p))
            .cloned()
            .collect())
    }

    async fn create_appointment(&self, new_appointment: NewAppointment) -> Result<Appointment> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            lead_id: new_appointment.lead_id,
            unit_id: new_appointment.unit_id,
            external_event_id: new_appointment.external_event_id,
            scheduled_at: new_appointment.scheduled_at,
            attendee_email: new_appointment.attendee_email,
            attendee_name: new_appointment.attendee_name,
            location: new_appointment.location,
            duration_minutes: new_appointment.duration_minutes,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .appointments
            .push(appointment.clone());
        Ok(appointment)
    }

    async fn appointment_by_event_id(
        &self,
        external_event_id: &str,
    ) -> Result<Option<Appointment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .appointments
            .iter()
            .find(|a| a.external_event_id == external_event_id)
            .cloned())
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut inner = self.inner.lock().unwrap();
        let appointment = inner
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("Appointment with ID {} not found", id)))?;
        appointment.status = status;
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }

    async fn count_appointments_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<AppointmentStatus>,
    ) -> Result<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .appointments
            .iter()
            .filter(|a| a.created_at >= start && a.created_at <= end)
            .filter(|a| status.is_none_or(|s| a.status == s))
            .count() as i64)
    }

    async fn count_appointments_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .appointments
            .iter()
            .filter(|a| {
                a.status == AppointmentStatus::Completed
                    && a.scheduled_at >= start
                    && a.scheduled_at <= end
            })
            .count() as i64)
    }

    async fn create_followup(&self, new_followup: NewFollowup) -> Result<Followup> {
        let followup = Followup {
            id: Uuid::new_v4(),
            lead_id: new_followup.lead_id,
            kind: new_followup.kind,
            content: new_followup.content,
            send_at: new_followup.send_at,
            status: FollowupStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
        };
        self.inner.lock().unwrap().followups.push(followup.clone());
        Ok(followup)
    }

    async fn due_followups(&self, now: DateTime<Utc>) -> Result<Vec<Followup>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .followups
            .iter()
            .filter(|f| f.status == FollowupStatus::Pending && f.send_at <= now)
            .cloned()
            .collect())
    }

    async fn mark_followup_sent(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let followup = inner
            .followups
            .iter_mut()
            .find(|f| f.id == id && f.status == FollowupStatus::Pending)
            .ok_or_else(|| Error::NotFound(format!("Pending followup with ID {} not found", id)))?;
        followup.status = FollowupStatus::Sent;
        followup.sent_at = Some(Utc::now());
        Ok(())
    }

    async fn cancel_pending_followups(&self, lead_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut canceled = 0;
        for followup in inner
            .followups
            .iter_mut()
            .filter(|f| f.lead_id == lead_id && f.status == FollowupStatus::Pending)
        {
            followup.status = FollowupStatus::Canceled;
            canceled += 1;
        }
        Ok(canceled)
    }

    async fn upsert_daily_metric(&self, metric: &DailyMetric) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.metrics.retain(|m| m.metric_date != metric.metric_date);
        inner.metrics.push(metric.clone());
        Ok(())
    }

    async fn daily_metrics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetric>> {
        let inner = self.inner.lock().unwrap();
        let mut metrics: Vec<DailyMetric> = inner
            .metrics
            .iter()
            .filter(|m| m.metric_date >= start && m.metric_date <= end)
            .cloned()
            .collect();
        metrics.sort_by_key(|m| std::cmp::Reverse(m.metric_date));
        Ok(metrics)
    }
}
