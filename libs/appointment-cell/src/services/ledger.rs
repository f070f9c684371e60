// libs/appointment-cell/src/services/ledger.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{BillingError, Customer, PaymentEntry, SalesInvoice, DOCSTATUS_SUBMITTED};

/// Accounting documents the billing hook reads and writes.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn customer_exists(&self, name: &str) -> Result<bool, BillingError>;

    async fn create_customer(&self, customer: &Customer) -> Result<(), BillingError>;

    /// Non-cancelled invoice already raised for `appointment`, if any.
    async fn invoice_for_appointment(&self, appointment: Uuid) -> Result<Option<SalesInvoice>, BillingError>;

    /// Insert the draft invoice and submit it.
    async fn submit_invoice(&self, invoice: SalesInvoice) -> Result<SalesInvoice, BillingError>;

    /// Submit an invoice already stored as a draft.
    async fn submit_draft_invoice(&self, name: &str) -> Result<SalesInvoice, BillingError>;

    async fn default_cash_account(&self, company: &str) -> Result<Option<String>, BillingError>;

    /// Insert the draft payment and submit it.
    async fn submit_payment(&self, payment: PaymentEntry) -> Result<PaymentEntry, BillingError>;
}

pub struct SupabaseLedger {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseLedger {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }

    async fn insert_and_submit(&self, table: &str, name: &str, row: Value) -> Result<Value, String> {
        self.supabase.insert(table, row, self.auth_token.as_deref()).await
            .map_err(|e| e.to_string())?;

        self.submit(table, name).await
    }

    async fn submit(&self, table: &str, name: &str) -> Result<Value, String> {
        let path = format!("/rest/v1/{}?name=eq.{}", table, urlencoding::encode(name));
        self.supabase.update(&path, json!({ "docstatus": DOCSTATUS_SUBMITTED }), self.auth_token.as_deref()).await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl LedgerGateway for SupabaseLedger {
    async fn customer_exists(&self, name: &str) -> Result<bool, BillingError> {
        let path = format!("/rest/v1/customers?name=eq.{}&select=name&limit=1", urlencoding::encode(name));

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn create_customer(&self, customer: &Customer) -> Result<(), BillingError> {
        let row = serde_json::to_value(customer)
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        self.supabase.insert("customers", row, self.auth_token.as_deref()).await
            .map_err(|e| BillingError::CustomerSetup {
                customer: customer.name.clone(),
                reason: e.to_string(),
            })?;

        info!("Created customer {}", customer.name);
        Ok(())
    }

    async fn invoice_for_appointment(&self, appointment: Uuid) -> Result<Option<SalesInvoice>, BillingError> {
        let path = format!("/rest/v1/sales_invoices?appointment=eq.{}&docstatus=neq.2&limit=1", appointment);

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(serde_json::from_value::<SalesInvoice>)
            .transpose()
            .map_err(|e| BillingError::DatabaseError(format!("Failed to parse sales invoice: {}", e)))
    }

    async fn submit_invoice(&self, invoice: SalesInvoice) -> Result<SalesInvoice, BillingError> {
        let row = serde_json::to_value(&invoice)
            .map_err(|e| BillingError::Invoice(e.to_string()))?;

        let submitted = self.insert_and_submit("sales_invoices", &invoice.name, row).await
            .map_err(BillingError::Invoice)?;

        debug!("Sales Invoice {} submitted", invoice.name);
        serde_json::from_value(submitted)
            .map_err(|e| BillingError::Invoice(format!("Failed to parse submitted invoice: {}", e)))
    }

    async fn submit_draft_invoice(&self, name: &str) -> Result<SalesInvoice, BillingError> {
        let submitted = self.submit("sales_invoices", name).await
            .map_err(BillingError::Invoice)?;

        debug!("Draft Sales Invoice {} submitted", name);
        serde_json::from_value(submitted)
            .map_err(|e| BillingError::Invoice(format!("Failed to parse submitted invoice: {}", e)))
    }

    async fn default_cash_account(&self, company: &str) -> Result<Option<String>, BillingError> {
        let path = format!(
            "/rest/v1/companies?name=eq.{}&select=name,default_cash_account&limit=1",
            urlencoding::encode(company)
        );

        let rows = self.supabase.select(&path, self.auth_token.as_deref()).await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        Ok(rows.first()
            .and_then(|row| row.get("default_cash_account"))
            .and_then(Value::as_str)
            .filter(|account| !account.is_empty())
            .map(str::to_string))
    }

    async fn submit_payment(&self, payment: PaymentEntry) -> Result<PaymentEntry, BillingError> {
        let row = serde_json::to_value(&payment)
            .map_err(|e| BillingError::Payment(e.to_string()))?;

        let submitted = self.insert_and_submit("payment_entries", &payment.name, row).await
            .map_err(BillingError::Payment)?;

        debug!("Payment Entry {} submitted", payment.name);
        serde_json::from_value(submitted)
            .map_err(|e| BillingError::Payment(format!("Failed to parse submitted payment: {}", e)))
    }
}
