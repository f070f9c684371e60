// libs/appointment-cell/src/services/billing.rs
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    Appointment, BillingError, Customer, HealthcareService, PaymentEntry, PaymentReference,
    PaymentSkip, SalesInvoice, DOCSTATUS_DRAFT,
};
use crate::services::ledger::LedgerGateway;
use crate::services::repository::{AppointmentRepository, ServiceCatalog};

/// Fixed parties and accounts used for appointment billing.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSettings {
    pub company: String,
    pub customer: String,
    pub mode_of_payment: String,
}

impl BillingSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            company: config.billing_company.clone(),
            customer: config.walk_in_customer.clone(),
            mode_of_payment: config.mode_of_payment.clone(),
        }
    }
}

/// What billing a completed appointment produced. Failures before the
/// invoice exists are `Failed`; a failed payment only downgrades the
/// outcome to `InvoiceOnly`.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingOutcome {
    Invoiced { invoice: SalesInvoice, payment: PaymentEntry },
    InvoiceOnly { invoice: SalesInvoice, reason: PaymentSkip },
    AlreadyBilled { invoice: SalesInvoice },
    Failed(BillingError),
}

impl BillingOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, BillingOutcome::Failed(_))
    }

    pub fn invoice(&self) -> Option<&SalesInvoice> {
        match self {
            BillingOutcome::Invoiced { invoice, .. }
            | BillingOutcome::InvoiceOnly { invoice, .. }
            | BillingOutcome::AlreadyBilled { invoice } => Some(invoice),
            BillingOutcome::Failed(_) => None,
        }
    }

    pub fn summary(&self) -> BillingSummary {
        let (status, payment, message) = match self {
            BillingOutcome::Invoiced { payment, .. } => ("invoiced", Some(payment.name.clone()), None),
            BillingOutcome::InvoiceOnly { reason, .. } => ("invoice_only", None, Some(reason.to_string())),
            BillingOutcome::AlreadyBilled { .. } => ("already_billed", None, None),
            BillingOutcome::Failed(e) => ("failed", None, Some(e.to_string())),
        };

        BillingSummary {
            status,
            invoice: self.invoice().map(|invoice| invoice.name.clone()),
            payment,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BillingSummary {
    pub status: &'static str,
    pub invoice: Option<String>,
    pub payment: Option<String>,
    pub message: Option<String>,
}

pub struct BillingService {
    appointments: Arc<dyn AppointmentRepository>,
    catalog: Arc<dyn ServiceCatalog>,
    ledger: Arc<dyn LedgerGateway>,
    settings: BillingSettings,
}

impl BillingService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        catalog: Arc<dyn ServiceCatalog>,
        ledger: Arc<dyn LedgerGateway>,
        settings: BillingSettings,
    ) -> Self {
        Self { appointments, catalog, ledger, settings }
    }

    /// Raise the invoice, and a payment when there is something to pay, for
    /// a completed appointment. Never fails; inspect the outcome instead.
    pub async fn bill_completed_appointment(&self, appointment: &mut Appointment) -> BillingOutcome {
        debug!("Billing completed appointment {}", appointment.id);

        let invoice = match self.ledger.invoice_for_appointment(appointment.id).await {
            Ok(Some(invoice)) if invoice.docstatus == DOCSTATUS_DRAFT => {
                // Left behind when a previous submit failed half way.
                info!("Resuming draft invoice {} for appointment {}", invoice.name, appointment.id);
                self.ledger.submit_draft_invoice(&invoice.name).await
            }
            Ok(Some(invoice)) => {
                info!("Appointment {} already billed by {}", appointment.id, invoice.name);
                return BillingOutcome::AlreadyBilled { invoice };
            }
            Ok(None) => self.create_invoice(appointment).await,
            Err(e) => Err(e),
        };

        let invoice = match invoice {
            Ok(invoice) => invoice,
            Err(e) => return BillingOutcome::Failed(e),
        };
        info!("Sales Invoice {} submitted for appointment {}", invoice.name, appointment.id);

        if appointment.billable_amount() <= 0.0 {
            info!("Payment Entry skipped for appointment {} (total_amount = 0)", appointment.id);
            return BillingOutcome::InvoiceOnly { invoice, reason: PaymentSkip::ZeroAmount };
        }

        match self.create_payment(appointment, &invoice).await {
            Ok(payment) => {
                info!("Payment Entry created: {}", payment.name);
                BillingOutcome::Invoiced { invoice, payment }
            }
            Err(reason) => {
                warn!("Payment Entry skipped for appointment {}: {}", appointment.id, reason);
                BillingOutcome::InvoiceOnly { invoice, reason }
            }
        }
    }

    async fn create_invoice(&self, appointment: &mut Appointment) -> Result<SalesInvoice, BillingError> {
        self.ensure_customer().await?;

        let service = self.billed_service(appointment).await?;
        let item_code = service.linked_item
            .clone()
            .filter(|item| !item.is_empty())
            .ok_or_else(|| BillingError::MissingLinkedItem(service.name.clone()))?;

        if appointment.needs_amount_backfill() {
            let price = service.effective_price();
            self.appointments.set_total_amount(appointment.id, price).await
                .map_err(|e| BillingError::AmountBackfill(e.to_string()))?;
            appointment.total_amount = Some(price);
            debug!("Backfilled total_amount {:.2} on {}", price, appointment.id);
        }

        let invoice = SalesInvoice::single_line(
            &self.settings.customer,
            appointment.id,
            &item_code,
            appointment.billable_amount(),
        );

        self.ledger.submit_invoice(invoice).await
    }

    async fn ensure_customer(&self) -> Result<(), BillingError> {
        if self.ledger.customer_exists(&self.settings.customer).await? {
            return Ok(());
        }

        self.ledger.create_customer(&Customer::walk_in(&self.settings.customer)).await
    }

    async fn billed_service(&self, appointment: &Appointment) -> Result<HealthcareService, BillingError> {
        let name = appointment.service.as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(BillingError::NoService)?;

        self.catalog.get_service(name).await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?
            .ok_or_else(|| BillingError::ServiceNotFound(name.to_string()))
    }

    async fn create_payment(&self, appointment: &Appointment, invoice: &SalesInvoice) -> Result<PaymentEntry, PaymentSkip> {
        let paid_to = self.ledger.default_cash_account(&self.settings.company).await
            .map_err(|e| PaymentSkip::Failed(e.to_string()))?
            .ok_or_else(|| PaymentSkip::NoCashAccount { company: self.settings.company.clone() })?;

        let amount = appointment.billable_amount();
        let payment = PaymentEntry {
            name: format!("ACC-PAY-{}", uuid::Uuid::new_v4().simple()),
            payment_type: "Receive".to_string(),
            party_type: "Customer".to_string(),
            party: self.settings.customer.clone(),
            paid_amount: amount,
            received_amount: amount,
            reference_no: format!("PAY-{}", appointment.id),
            reference_date: appointment.appointment_date,
            mode_of_payment: self.settings.mode_of_payment.clone(),
            paid_to,
            references: vec![PaymentReference {
                reference_doctype: "Sales Invoice".to_string(),
                reference_name: invoice.name.clone(),
                allocated_amount: amount,
            }],
            docstatus: DOCSTATUS_DRAFT,
        };

        self.ledger.submit_payment(payment).await
            .map_err(|e| PaymentSkip::Failed(e.to_string()))
    }
}
