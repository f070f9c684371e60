// libs/appointment-cell/src/services/settings.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentError, ClinicHours, ClinicSettingsRecord};
use crate::services::schedule::parse_time;

/// Source of the clinic's working-hours window.
#[async_trait]
pub trait ClinicHoursProvider: Send + Sync {
    async fn clinic_hours(&self) -> Result<ClinicHours, AppointmentError>;
}

impl ClinicSettingsRecord {
    pub fn to_hours(&self) -> Result<ClinicHours, AppointmentError> {
        let (start, end) = match (&self.working_hours_start, &self.working_hours_end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppointmentError::SettingsUnavailable(
                    "Clinic working hours are not configured".to_string(),
                ))
            }
        };

        let hours = ClinicHours {
            open: parse_time(start)?,
            close: parse_time(end)?,
        };

        if hours.open >= hours.close {
            warn!("Clinic opens at {} but closes at {}", hours.open, hours.close);
        }

        Ok(hours)
    }
}

/// Reads the singleton `clinic_settings` row on every call.
pub struct SupabaseClinicSettings {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseClinicSettings {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }
}

#[async_trait]
impl ClinicHoursProvider for SupabaseClinicSettings {
    async fn clinic_hours(&self) -> Result<ClinicHours, AppointmentError> {
        let rows = self.supabase
            .select(
                "/rest/v1/clinic_settings?select=working_hours_start,working_hours_end&limit=1",
                self.auth_token.as_deref(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let record: ClinicSettingsRecord = rows.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::SettingsUnavailable("Clinic Settings record is missing".to_string()))
            .and_then(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse clinic settings: {}", e)))
            })?;

        let hours = record.to_hours()?;
        debug!("Clinic hours {} - {}", hours.open, hours.close);
        Ok(hours)
    }
}
