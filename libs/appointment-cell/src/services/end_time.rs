// libs/appointment-cell/src/services/end_time.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::models::AppointmentError;
use crate::services::repository::ServiceCatalog;
use crate::services::schedule::{end_time_after, parse_date, parse_time};

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub struct EndTimeCalculator {
    catalog: Arc<dyn ServiceCatalog>,
}

impl EndTimeCalculator {
    pub fn new(catalog: Arc<dyn ServiceCatalog>) -> Self {
        Self { catalog }
    }

    /// Form-facing variant: blank or missing inputs give `None`, malformed
    /// ones an [`AppointmentError::InvalidTime`].
    pub async fn calculate_end_time(
        &self,
        service: Option<&str>,
        appointment_date: Option<&str>,
        appointment_time: Option<&str>,
    ) -> Result<Option<NaiveTime>, AppointmentError> {
        let (Some(service), Some(date), Some(time)) =
            (present(service), present(appointment_date), present(appointment_time))
        else {
            return Ok(None);
        };

        let date = parse_date(date)?;
        let time = parse_time(time)?;
        self.end_time_for(service, date, time).await
    }

    /// Start plus the service's duration; `None` if the service is unknown.
    pub async fn end_time_for(
        &self,
        service: &str,
        appointment_date: NaiveDate,
        appointment_time: NaiveTime,
    ) -> Result<Option<NaiveTime>, AppointmentError> {
        let Some(service_doc) = self.catalog.get_service(service).await? else {
            warn!("Healthcare Service {} not found, cannot derive end time", service);
            return Ok(None);
        };

        let duration = service_doc.effective_duration_minutes();
        if duration < 0 {
            return Err(AppointmentError::InvalidTime(format!(
                "Healthcare Service {} has a negative duration ({} min)", service, duration
            )));
        }

        let end = end_time_after(appointment_date, appointment_time, duration).ok_or_else(|| {
            AppointmentError::InvalidTime(format!(
                "Healthcare Service {} duration of {} min is out of range", service, duration
            ))
        })?;

        debug!("End time for {} at {} {}: {} ({} min)",
               service, appointment_date, appointment_time, end, duration);
        Ok(Some(end))
    }
}
