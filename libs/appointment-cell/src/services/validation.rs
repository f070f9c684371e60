// libs/appointment-cell/src/services/validation.rs
use std::sync::Arc;

use crate::models::{Appointment, AppointmentError};
use crate::services::conflict::ConflictDetectionService;
use crate::services::hours::WorkingHoursService;
use crate::services::repository::AppointmentRepository;
use crate::services::settings::ClinicHoursProvider;

/// Pre-save hook: overlap first, then working hours.
pub struct AppointmentValidator {
    conflicts: ConflictDetectionService,
    working_hours: WorkingHoursService,
}

impl AppointmentValidator {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        clinic_hours: Arc<dyn ClinicHoursProvider>,
    ) -> Self {
        Self {
            conflicts: ConflictDetectionService::new(appointments),
            working_hours: WorkingHoursService::new(clinic_hours),
        }
    }

    pub async fn validate(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        self.conflicts.check_conflicts(appointment).await?;
        self.working_hours.check_working_hours(appointment).await
    }
}
