use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::with_supabase(&self.supabase_url, &self.supabase_anon_key, &self.jwt_secret)
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "patient")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn receptionist(email: &str) -> Self {
        Self::new(email, "receptionist")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Canned PostgREST rows for the clinic tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn clinic_settings_response(start: &str, end: &str) -> Value {
        json!({
            "working_hours_start": start,
            "working_hours_end": end
        })
    }

    pub fn healthcare_service_response(name: &str, duration_minutes: Option<i64>, price: Option<f64>, linked_item: Option<&str>) -> Value {
        json!({
            "name": name,
            "service_name": name,
            "duration_minutes": duration_minutes,
            "price": price,
            "linked_item": linked_item
        })
    }

    pub fn appointment_response(id: &str, date: &str, start: &str, end: &str, status: &str, service: &str, total_amount: Option<f64>) -> Value {
        json!({
            "id": id,
            "patient_name": "Test Patient",
            "patient_contact": "9999999999",
            "appointment_date": date,
            "appointment_time": start,
            "estimated_end_time": end,
            "status": status,
            "service": service,
            "total_amount": total_amount
        })
    }

    pub fn customer_response(name: &str) -> Value {
        json!({
            "name": name,
            "customer_name": name,
            "customer_group": "All Customer Groups",
            "territory": "All Territories"
        })
    }

    pub fn sales_invoice_response(name: &str, appointment_id: &str, amount: f64, docstatus: i32) -> Value {
        json!({
            "name": name,
            "customer": "Walk-in Customer",
            "appointment": appointment_id,
            "grand_total": amount,
            "docstatus": docstatus,
            "items": [{
                "item_code": "Operation",
                "qty": 1.0,
                "rate": amount,
                "amount": amount
            }]
        })
    }

    pub fn company_response(name: &str, default_cash_account: Option<&str>) -> Value {
        json!({
            "name": name,
            "default_cash_account": default_cash_account
        })
    }

    pub fn payment_entry_response(name: &str, invoice: &str, amount: f64, docstatus: i32) -> Value {
        json!({
            "name": name,
            "payment_type": "Receive",
            "party_type": "Customer",
            "party": "Walk-in Customer",
            "paid_amount": amount,
            "received_amount": amount,
            "reference_no": format!("PAY-{}", invoice),
            "reference_date": null,
            "mode_of_payment": "Cash",
            "paid_to": "Cash - P",
            "docstatus": docstatus,
            "references": [{
                "reference_doctype": "Sales Invoice",
                "reference_name": invoice,
                "allocated_amount": amount
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::default().to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::receptionist("desk@example.com");
        let user_model = user.to_user();

        assert_eq!(user_model.role.as_deref(), Some("receptionist"));
        assert_eq!(user_model.id, user.id);
        assert!(user_model.can_manage_appointments());
        assert!(!TestUser::patient("p@example.com").to_user().can_manage_appointments());
    }

    #[test]
    fn test_jwt_token_shape() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }
}
