// libs/appointment-cell/src/services/hours.rs
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentError};
use crate::services::schedule::{format_hm, TimeWindow};
use crate::services::settings::ClinicHoursProvider;

pub struct WorkingHoursService {
    clinic_hours: Arc<dyn ClinicHoursProvider>,
}

impl WorkingHoursService {
    pub fn new(clinic_hours: Arc<dyn ClinicHoursProvider>) -> Self {
        Self { clinic_hours }
    }

    /// Reject appointments that start before opening or end after closing.
    pub async fn check_working_hours(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let Some(window) = TimeWindow::of(appointment) else {
            debug!("Skipping working hours check for {}: schedule incomplete", appointment.id);
            return Ok(());
        };

        let hours = self.clinic_hours.clinic_hours().await?;

        if !window.fits_within(&hours) {
            warn!("Appointment {} at {} - {} is outside clinic hours",
                  appointment.id, window.start, window.end);
            return Err(AppointmentError::OutsideWorkingHours {
                open: format_hm(hours.open),
                close: format_hm(hours.close),
            });
        }

        Ok(())
    }
}
