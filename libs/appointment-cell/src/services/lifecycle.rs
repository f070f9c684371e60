// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{Appointment, AppointmentStatus, PaymentSkip};
use crate::services::billing::{BillingOutcome, BillingService};
use crate::services::error_log::ErrorLogSink;

pub const INVOICE_FAILURE_TITLE: &str = "Sales Invoice Creation Failed";
pub const PAYMENT_FAILURE_TITLE: &str = "Payment Entry Failed";

/// Post-save hooks for appointments.
pub struct AppointmentLifecycleService {
    billing: BillingService,
    error_log: Arc<dyn ErrorLogSink>,
}

impl AppointmentLifecycleService {
    pub fn new(billing: BillingService, error_log: Arc<dyn ErrorLogSink>) -> Self {
        Self { billing, error_log }
    }

    /// True only on the save that moves an appointment into Completed.
    pub fn is_completion_transition(previous: Option<&AppointmentStatus>, current: &AppointmentStatus) -> bool {
        *current == AppointmentStatus::Completed && previous != Some(&AppointmentStatus::Completed)
    }

    /// Runs after every successful save. Returns the billing outcome when the
    /// save completed the appointment.
    pub async fn after_save(
        &self,
        previous: Option<&AppointmentStatus>,
        appointment: &mut Appointment,
    ) -> Option<BillingOutcome> {
        if appointment.status == AppointmentStatus::Completed {
            info!("Patient Appointment {} has been marked as Completed.", appointment.id);
        }

        if !Self::is_completion_transition(previous, &appointment.status) {
            return None;
        }

        Some(self.on_status_complete(appointment).await)
    }

    /// Completion hook. Billing problems are logged and recorded, never
    /// raised; the appointment stays Completed whatever happens here.
    pub async fn on_status_complete(&self, appointment: &mut Appointment) -> BillingOutcome {
        info!("Hook triggered for {}", appointment.id);

        let outcome = self.billing.bill_completed_appointment(appointment).await;

        match &outcome {
            BillingOutcome::Failed(e) => {
                self.error_log.log_error(INVOICE_FAILURE_TITLE, &e.to_string()).await;
            }
            BillingOutcome::InvoiceOnly { reason: PaymentSkip::ZeroAmount, .. } => {}
            BillingOutcome::InvoiceOnly { reason, invoice } => {
                warn!("Invoice {} left unpaid for appointment {}", invoice.name, appointment.id);
                self.error_log.log_error(PAYMENT_FAILURE_TITLE, &reason.to_string()).await;
            }
            BillingOutcome::Invoiced { .. } | BillingOutcome::AlreadyBilled { .. } => {}
        }

        outcome
    }
}
