// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use thiserror::Error;

/// Minutes used when a service has no configured duration.
pub const DEFAULT_SERVICE_DURATION_MINUTES: i64 = 3;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub estimated_end_time: Option<NaiveTime>,
    pub status: AppointmentStatus,
    /// Name of the linked Healthcare Service.
    pub service: Option<String>,
    pub total_amount: Option<f64>,
}

impl Appointment {
    /// Amount to bill, treating unset as zero.
    pub fn billable_amount(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }

    pub fn needs_amount_backfill(&self) -> bool {
        self.total_amount.map_or(true, |amount| amount == 0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A bookable clinic service. Read-only from this cell's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthcareService {
    pub name: String,
    pub duration_minutes: Option<i64>,
    pub price: Option<f64>,
    /// Catalog item code used on invoice lines.
    pub linked_item: Option<String>,
}

impl HealthcareService {
    pub fn effective_duration_minutes(&self) -> i64 {
        match self.duration_minutes {
            Some(minutes) if minutes != 0 => minutes,
            _ => DEFAULT_SERVICE_DURATION_MINUTES,
        }
    }

    pub fn effective_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// Raw singleton settings row as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicSettingsRecord {
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

// ==============================================================================
// LEDGER DOCUMENTS
// ==============================================================================

pub const DOCSTATUS_DRAFT: i32 = 0;
pub const DOCSTATUS_SUBMITTED: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub name: String,
    pub customer_name: String,
    pub customer_group: String,
    pub territory: String,
}

impl Customer {
    pub fn walk_in(name: &str) -> Self {
        Self {
            name: name.to_string(),
            customer_name: name.to_string(),
            customer_group: "All Customer Groups".to_string(),
            territory: "All Territories".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesInvoiceItem {
    pub item_code: String,
    pub qty: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesInvoice {
    pub name: String,
    pub customer: String,
    pub appointment: Uuid,
    pub items: Vec<SalesInvoiceItem>,
    pub grand_total: f64,
    pub docstatus: i32,
}

impl SalesInvoice {
    /// Draft invoice with a single line for one unit of `item_code`.
    pub fn single_line(customer: &str, appointment: Uuid, item_code: &str, amount: f64) -> Self {
        Self {
            name: format!("ACC-SINV-{}", Uuid::new_v4().simple()),
            customer: customer.to_string(),
            appointment,
            items: vec![SalesInvoiceItem {
                item_code: item_code.to_string(),
                qty: 1.0,
                rate: amount,
                amount,
            }],
            grand_total: amount,
            docstatus: DOCSTATUS_DRAFT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReference {
    pub reference_doctype: String,
    pub reference_name: String,
    pub allocated_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentEntry {
    pub name: String,
    pub payment_type: String,
    pub party_type: String,
    pub party: String,
    pub paid_amount: f64,
    pub received_amount: f64,
    pub reference_no: String,
    pub reference_date: Option<NaiveDate>,
    pub mode_of_payment: String,
    pub paid_to: String,
    pub references: Vec<PaymentReference>,
    pub docstatus: i32,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BookAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    /// Precomputed by the booking form; derived from the service when absent.
    pub estimated_end_time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub service: Option<String>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub estimated_end_time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub service: Option<String>,
    pub total_amount: Option<f64>,
}

impl UpdateAppointmentRequest {
    pub fn status_only(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn touches_schedule(&self) -> bool {
        self.appointment_date.is_some() || self.appointment_time.is_some() || self.service.is_some()
    }

    /// Apply the set fields, reporting whether the end time should be derived again.
    pub fn apply_to(self, appointment: &mut Appointment) -> bool {
        let recompute_end = self.touches_schedule() && self.estimated_end_time.is_none();

        if let Some(v) = self.patient_name { appointment.patient_name = Some(v); }
        if let Some(v) = self.patient_contact { appointment.patient_contact = Some(v); }
        if let Some(v) = self.appointment_date { appointment.appointment_date = Some(v); }
        if let Some(v) = self.appointment_time { appointment.appointment_time = Some(v); }
        if let Some(v) = self.estimated_end_time { appointment.estimated_end_time = Some(v); }
        if let Some(v) = self.status { appointment.status = v; }
        if let Some(v) = self.service { appointment.service = Some(v); }
        if let Some(v) = self.total_amount { appointment.total_amount = Some(v); }

        recompute_end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// Query of the public end-time lookup. Values arrive as raw form strings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EndTimeQuery {
    pub service: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServicePriceQuery {
    pub service: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment overlaps with existing appointment {existing} from {from} to {to}")]
    Conflict { existing: Uuid, from: String, to: String },

    #[error("Appointment must be scheduled between {open} and {close} only.")]
    OutsideWorkingHours { open: String, close: String },

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Clinic settings unavailable: {0}")]
    SettingsUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("Could not set up customer {customer}: {reason}")]
    CustomerSetup { customer: String, reason: String },

    #[error("Appointment has no Healthcare Service")]
    NoService,

    #[error("Healthcare Service {0} not found")]
    ServiceNotFound(String),

    #[error("No linked Item found for Healthcare Service {0}")]
    MissingLinkedItem(String),

    #[error("Could not store total amount on appointment: {0}")]
    AmountBackfill(String),

    #[error("Sales Invoice could not be created: {0}")]
    Invoice(String),

    #[error("Payment Entry could not be created: {0}")]
    Payment(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Why an invoice was left without a payment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentSkip {
    #[error("total_amount is 0")]
    ZeroAmount,

    #[error("No default cash account configured for company {company}")]
    NoCashAccount { company: String },

    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_row_deserializes() {
        let row = json!({
            "id": "6f1d7c1a-8a56-4c36-9a3e-58f06f6ac2b1",
            "patient_name": "Test Patient",
            "patient_contact": "9999999999",
            "appointment_date": "2025-10-30",
            "appointment_time": "10:00:00",
            "estimated_end_time": "11:00:00",
            "status": "Scheduled",
            "service": "Operation",
            "total_amount": 1000.0
        });

        let appointment: Appointment = serde_json::from_value(row).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.appointment_time, NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(appointment.billable_amount(), 1000.0);
    }

    #[test]
    fn test_service_duration_defaults_to_three_minutes() {
        let mut service = HealthcareService {
            name: "Checkup".to_string(),
            duration_minutes: None,
            price: None,
            linked_item: None,
        };
        assert_eq!(service.effective_duration_minutes(), 3);

        service.duration_minutes = Some(0);
        assert_eq!(service.effective_duration_minutes(), 3);

        service.duration_minutes = Some(45);
        assert_eq!(service.effective_duration_minutes(), 45);

        service.duration_minutes = Some(-30);
        assert_eq!(service.effective_duration_minutes(), -30);
        assert_eq!(service.effective_price(), 0.0);
    }

    #[test]
    fn test_amount_backfill_needed_for_unset_or_zero() {
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: None,
            patient_contact: None,
            appointment_date: None,
            appointment_time: None,
            estimated_end_time: None,
            status: AppointmentStatus::Completed,
            service: None,
            total_amount: None,
        };
        assert!(appointment.needs_amount_backfill());
        appointment.total_amount = Some(0.0);
        assert!(appointment.needs_amount_backfill());
        appointment.total_amount = Some(10.0);
        assert!(!appointment.needs_amount_backfill());
    }

    #[test]
    fn test_update_request_flags_end_time_recompute() {
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: None,
            patient_contact: None,
            appointment_date: NaiveDate::from_ymd_opt(2025, 9, 2),
            appointment_time: NaiveTime::from_hms_opt(11, 0, 0),
            estimated_end_time: NaiveTime::from_hms_opt(12, 0, 0),
            status: AppointmentStatus::Scheduled,
            service: Some("Operation".to_string()),
            total_amount: Some(1000.0),
        };

        let moved = UpdateAppointmentRequest {
            appointment_time: NaiveTime::from_hms_opt(13, 0, 0),
            ..Default::default()
        };
        assert!(moved.apply_to(&mut appointment));

        let completed = UpdateAppointmentRequest::status_only(AppointmentStatus::Completed);
        assert!(!completed.apply_to(&mut appointment));
        assert_eq!(appointment.status, AppointmentStatus::Completed);
    }

    #[test]
    fn test_single_line_invoice() {
        let appointment = Uuid::new_v4();
        let invoice = SalesInvoice::single_line("Walk-in Customer", appointment, "Operation", 250.0);

        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].qty, 1.0);
        assert_eq!(invoice.items[0].rate, 250.0);
        assert_eq!(invoice.grand_total, 250.0);
        assert_eq!(invoice.docstatus, DOCSTATUS_DRAFT);
        assert!(invoice.name.starts_with("ACC-SINV-"));
    }
}
