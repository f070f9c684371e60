pub mod billing;
pub mod booking;
pub mod conflict;
pub mod end_time;
pub mod error_log;
pub mod hours;
pub mod ledger;
pub mod lifecycle;
pub mod pricing;
pub mod repository;
pub mod schedule;
pub mod settings;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use billing::{BillingOutcome, BillingService, BillingSettings, BillingSummary};
pub use booking::{AppointmentBackends, AppointmentBookingService};
pub use end_time::EndTimeCalculator;
pub use lifecycle::AppointmentLifecycleService;
pub use pricing::PricingService;
pub use validation::AppointmentValidator;
