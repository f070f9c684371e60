// libs/appointment-cell/src/services/repository.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, HealthcareService};

const APPOINTMENTS_TABLE: &str = "patient_appointments";
const SERVICES_TABLE: &str = "healthcare_services";

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Scheduled appointments on `date`, minus `exclude` when given.
    async fn scheduled_on(&self, date: NaiveDate, exclude: Option<Uuid>) -> Result<Vec<Appointment>, AppointmentError>;

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError>;

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError>;

    async fn set_total_amount(&self, id: Uuid, amount: f64) -> Result<(), AppointmentError>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn get_service(&self, name: &str) -> Result<Option<HealthcareService>, AppointmentError>;
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    fn parse_row(row: Value) -> Result<Appointment, AppointmentError> {
        serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    fn to_row(appointment: &Appointment) -> Result<Value, AppointmentError> {
        serde_json::to_value(appointment)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to serialize appointment: {}", e)))
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/{}?id=eq.{}&limit=1", APPOINTMENTS_TABLE, id);

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(Self::parse_rows(rows)?.into_iter().next())
    }

    async fn scheduled_on(&self, date: NaiveDate, exclude: Option<Uuid>) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = vec![
            format!("status=eq.{}", AppointmentStatus::Scheduled),
            format!("appointment_date=eq.{}", date.format("%Y-%m-%d")),
        ];

        if let Some(exclude_id) = exclude {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!("/rest/v1/{}?{}&order=appointment_time.asc",
                           APPOINTMENTS_TABLE, query_parts.join("&"));

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        debug!("Found {} scheduled appointments on {}", rows.len(), date);
        Self::parse_rows(rows)
    }

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let row = self.supabase.insert(APPOINTMENTS_TABLE, Self::to_row(appointment)?, self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Self::parse_row(row)
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/{}?id=eq.{}", APPOINTMENTS_TABLE, appointment.id);

        let row = self.supabase.update(&path, Self::to_row(appointment)?, self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Self::parse_row(row)
    }

    async fn set_total_amount(&self, id: Uuid, amount: f64) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/{}?id=eq.{}", APPOINTMENTS_TABLE, id);

        self.supabase.update(&path, json!({ "total_amount": amount }), self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

pub struct SupabaseServiceCatalog {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseServiceCatalog {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }
}

#[async_trait]
impl ServiceCatalog for SupabaseServiceCatalog {
    async fn get_service(&self, name: &str) -> Result<Option<HealthcareService>, AppointmentError> {
        let path = format!(
            "/rest/v1/{}?name=eq.{}&select=name,duration_minutes,price,linked_item&limit=1",
            SERVICES_TABLE,
            urlencoding::encode(name)
        );

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(serde_json::from_value::<HealthcareService>)
            .transpose()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse service {}: {}", name, e)))
    }
}
