// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentError};
use crate::services::repository::AppointmentRepository;
use crate::services::schedule::{format_hm, TimeWindow};

pub struct ConflictDetectionService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictDetectionService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// Reject `appointment` if it overlaps another Scheduled appointment on
    /// the same date. Partially filled appointments pass untouched.
    pub async fn check_conflicts(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let window = match TimeWindow::of(appointment) {
            Some(window) => window,
            None => {
                debug!("Skipping conflict check for {}: schedule incomplete", appointment.id);
                return Ok(());
            }
        };

        debug!("Checking conflicts for {} from {} to {}",
               appointment.id, window.start, window.end);

        let existing_appointments = self.appointments
            .scheduled_on(window.date(), Some(appointment.id))
            .await?;

        for existing in existing_appointments.iter().filter(|a| a.id != appointment.id) {
            let Some(existing_window) = TimeWindow::of(existing) else {
                continue;
            };

            if window.overlaps(&existing_window) {
                warn!("Appointment {} overlaps with {}", appointment.id, existing.id);
                return Err(AppointmentError::Conflict {
                    existing: existing.id,
                    from: format_hm(existing_window.start.time()),
                    to: format_hm(existing_window.end.time()),
                });
            }
        }

        Ok(())
    }
}
