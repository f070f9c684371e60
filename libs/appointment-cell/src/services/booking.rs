// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::billing::{BillingOutcome, BillingService, BillingSettings};
use crate::services::end_time::EndTimeCalculator;
use crate::services::error_log::{ErrorLogSink, SupabaseErrorLog};
use crate::services::ledger::{LedgerGateway, SupabaseLedger};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::pricing::PricingService;
use crate::services::repository::{
    AppointmentRepository, ServiceCatalog, SupabaseAppointmentRepository, SupabaseServiceCatalog,
};
use crate::services::settings::{ClinicHoursProvider, SupabaseClinicSettings};
use crate::services::validation::AppointmentValidator;

/// Every collaborator the appointment document needs.
#[derive(Clone)]
pub struct AppointmentBackends {
    pub appointments: Arc<dyn AppointmentRepository>,
    pub catalog: Arc<dyn ServiceCatalog>,
    pub clinic_hours: Arc<dyn ClinicHoursProvider>,
    pub ledger: Arc<dyn LedgerGateway>,
    pub error_log: Arc<dyn ErrorLogSink>,
}

impl AppointmentBackends {
    /// Supabase-backed collaborators acting with `auth_token`, or anon.
    pub fn supabase(config: &AppConfig, auth_token: Option<&str>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let token = auth_token.map(str::to_string);

        Self {
            appointments: Arc::new(SupabaseAppointmentRepository::new(supabase.clone(), token.clone())),
            catalog: Arc::new(SupabaseServiceCatalog::new(supabase.clone(), token.clone())),
            clinic_hours: Arc::new(SupabaseClinicSettings::new(supabase.clone(), token.clone())),
            ledger: Arc::new(SupabaseLedger::new(supabase.clone(), token.clone())),
            error_log: Arc::new(SupabaseErrorLog::new(supabase, token)),
        }
    }
}

pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentRepository>,
    validator: AppointmentValidator,
    end_time: EndTimeCalculator,
    pricing: PricingService,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig, auth_token: Option<&str>) -> Self {
        Self::with_backends(AppointmentBackends::supabase(config, auth_token), BillingSettings::from_config(config))
    }

    pub fn with_backends(backends: AppointmentBackends, billing_settings: BillingSettings) -> Self {
        let billing = BillingService::new(
            backends.appointments.clone(),
            backends.catalog.clone(),
            backends.ledger,
            billing_settings,
        );

        Self {
            appointments: backends.appointments.clone(),
            validator: AppointmentValidator::new(backends.appointments, backends.clinic_hours),
            end_time: EndTimeCalculator::new(backends.catalog.clone()),
            pricing: PricingService::new(backends.catalog),
            lifecycle: AppointmentLifecycleService::new(billing, backends.error_log),
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<(Appointment, Option<BillingOutcome>), AppointmentError> {
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: request.patient_name,
            patient_contact: request.patient_contact,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            estimated_end_time: request.estimated_end_time,
            status: request.status.unwrap_or_default(),
            service: request.service,
            total_amount: request.total_amount,
        };

        if appointment.estimated_end_time.is_none() {
            self.fill_end_time(&mut appointment).await?;
        }

        if appointment.total_amount.is_none() {
            appointment.total_amount = Some(self.pricing.get_service_price(appointment.service.as_deref()).await?);
        }

        self.validator.validate(&appointment).await?;

        let mut stored = self.appointments.insert(&appointment).await?;
        info!("Appointment {} booked on {:?} at {:?}",
              stored.id, stored.appointment_date, stored.appointment_time);

        let billing = self.lifecycle.after_save(None, &mut stored).await;
        Ok((stored, billing))
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments.get(appointment_id).await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<(Appointment, Option<BillingOutcome>), AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;
        let previous_status = appointment.status.clone();

        if request.apply_to(&mut appointment) {
            self.fill_end_time(&mut appointment).await?;
        }

        self.validator.validate(&appointment).await?;

        let mut stored = self.appointments.update(&appointment).await?;
        debug!("Appointment {} saved with status {}", stored.id, stored.status);

        let billing = self.lifecycle.after_save(Some(&previous_status), &mut stored).await;
        Ok((stored, billing))
    }

    pub async fn change_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<(Appointment, Option<BillingOutcome>), AppointmentError> {
        self.update_appointment(appointment_id, UpdateAppointmentRequest::status_only(status)).await
    }

    async fn fill_end_time(&self, appointment: &mut Appointment) -> Result<(), AppointmentError> {
        if let (Some(service), Some(date), Some(time)) =
            (appointment.service.as_deref(), appointment.appointment_date, appointment.appointment_time)
        {
            appointment.estimated_end_time = self.end_time.end_time_for(service, date, time).await?;
        }
        Ok(())
    }
}
