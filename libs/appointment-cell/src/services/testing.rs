// In-memory stand-ins for the Supabase-backed seams.
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::*;
use crate::services::error_log::ErrorLogSink;
use crate::services::ledger::LedgerGateway;
use crate::services::repository::{AppointmentRepository, ServiceCatalog};
use crate::services::settings::ClinicHoursProvider;

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn scheduled(day: NaiveDate, start: NaiveTime, end: NaiveTime) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_name: Some("Test Patient".to_string()),
        patient_contact: Some("9999999999".to_string()),
        appointment_date: Some(day),
        appointment_time: Some(start),
        estimated_end_time: Some(end),
        status: AppointmentStatus::Scheduled,
        service: Some("Operation".to_string()),
        total_amount: Some(1000.0),
    }
}

pub fn service(name: &str, duration: Option<i64>, price: Option<f64>, linked_item: Option<&str>) -> HealthcareService {
    HealthcareService {
        name: name.to_string(),
        duration_minutes: duration,
        price,
        linked_item: linked_item.map(str::to_string),
    }
}

#[derive(Default)]
pub struct FakeClinic {
    pub hours: Mutex<Option<ClinicHours>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub services: Mutex<Vec<HealthcareService>>,
    pub customers: Mutex<Vec<Customer>>,
    pub invoices: Mutex<Vec<SalesInvoice>>,
    pub payments: Mutex<Vec<PaymentEntry>>,
    pub cash_account: Mutex<Option<String>>,
    pub error_logs: Mutex<Vec<(String, String)>>,
    pub fail_customer: Mutex<bool>,
    pub fail_payment: Mutex<bool>,
}

impl FakeClinic {
    pub fn open(open: NaiveTime, close: NaiveTime) -> Self {
        let clinic = Self::default();
        *clinic.hours.lock().unwrap() = Some(ClinicHours { open, close });
        *clinic.cash_account.lock().unwrap() = Some("Cash - P".to_string());
        clinic
    }

    pub fn with_service(self, service: HealthcareService) -> Self {
        self.services.lock().unwrap().push(service);
        self
    }

    pub fn with_appointment(self, appointment: Appointment) -> Self {
        self.appointments.lock().unwrap().push(appointment);
        self
    }

    pub fn stored(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().unwrap().len()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.lock().unwrap().len()
    }
}

#[async_trait]
impl ClinicHoursProvider for FakeClinic {
    async fn clinic_hours(&self) -> Result<ClinicHours, AppointmentError> {
        self.hours.lock().unwrap()
            .ok_or_else(|| AppointmentError::SettingsUnavailable("Clinic working hours are not configured".to_string()))
    }
}

#[async_trait]
impl AppointmentRepository for FakeClinic {
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.stored(id))
    }

    async fn scheduled_on(&self, day: NaiveDate, exclude: Option<Uuid>) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.appointments.lock().unwrap().iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .filter(|a| a.appointment_date == Some(day))
            .filter(|a| Some(a.id) != exclude)
            .cloned()
            .collect())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment.clone())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.lock().unwrap();
        let slot = appointments.iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or(AppointmentError::NotFound)?;
        *slot = appointment.clone();
        Ok(appointment.clone())
    }

    async fn set_total_amount(&self, id: Uuid, amount: f64) -> Result<(), AppointmentError> {
        let mut appointments = self.appointments.lock().unwrap();
        let slot = appointments.iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppointmentError::NotFound)?;
        slot.total_amount = Some(amount);
        Ok(())
    }
}

#[async_trait]
impl ServiceCatalog for FakeClinic {
    async fn get_service(&self, name: &str) -> Result<Option<HealthcareService>, AppointmentError> {
        Ok(self.services.lock().unwrap().iter().find(|s| s.name == name).cloned())
    }
}

#[async_trait]
impl LedgerGateway for FakeClinic {
    async fn customer_exists(&self, name: &str) -> Result<bool, BillingError> {
        Ok(self.customers.lock().unwrap().iter().any(|c| c.name == name))
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), BillingError> {
        if *self.fail_customer.lock().unwrap() {
            return Err(BillingError::CustomerSetup {
                customer: customer.name.clone(),
                reason: "permission denied".to_string(),
            });
        }
        self.customers.lock().unwrap().push(customer.clone());
        Ok(())
    }

    async fn invoice_for_appointment(&self, appointment: Uuid) -> Result<Option<SalesInvoice>, BillingError> {
        Ok(self.invoices.lock().unwrap().iter().find(|i| i.appointment == appointment).cloned())
    }

    async fn submit_invoice(&self, mut invoice: SalesInvoice) -> Result<SalesInvoice, BillingError> {
        invoice.docstatus = DOCSTATUS_SUBMITTED;
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(invoice)
    }

    async fn submit_draft_invoice(&self, name: &str) -> Result<SalesInvoice, BillingError> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices.iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| BillingError::Invoice(format!("Sales Invoice {} not found", name)))?;
        invoice.docstatus = DOCSTATUS_SUBMITTED;
        Ok(invoice.clone())
    }

    async fn default_cash_account(&self, _company: &str) -> Result<Option<String>, BillingError> {
        Ok(self.cash_account.lock().unwrap().clone())
    }

    async fn submit_payment(&self, mut payment: PaymentEntry) -> Result<PaymentEntry, BillingError> {
        if *self.fail_payment.lock().unwrap() {
            return Err(BillingError::Payment("Mode of Payment Cash has no account".to_string()));
        }
        payment.docstatus = DOCSTATUS_SUBMITTED;
        self.payments.lock().unwrap().push(payment.clone());
        Ok(payment)
    }
}

#[async_trait]
impl ErrorLogSink for FakeClinic {
    async fn log_error(&self, title: &str, message: &str) {
        self.error_logs.lock().unwrap().push((title.to_string(), message.to_string()));
    }
}
