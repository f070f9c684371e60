use std::env;
use tracing::warn;

pub const DEFAULT_BILLING_COMPANY: &str = "Parvati";
pub const DEFAULT_WALK_IN_CUSTOMER: &str = "Walk-in Customer";
pub const DEFAULT_MODE_OF_PAYMENT: &str = "Cash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    /// Company whose default cash account receives appointment payments.
    pub billing_company: String,
    pub walk_in_customer: String,
    pub mode_of_payment: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            billing_company: env::var("BILLING_COMPANY")
                .unwrap_or_else(|_| {
                    warn!("BILLING_COMPANY not set, using default");
                    DEFAULT_BILLING_COMPANY.to_string()
                }),
            walk_in_customer: env::var("WALK_IN_CUSTOMER")
                .unwrap_or_else(|_| DEFAULT_WALK_IN_CUSTOMER.to_string()),
            mode_of_payment: env::var("MODE_OF_PAYMENT")
                .unwrap_or_else(|_| DEFAULT_MODE_OF_PAYMENT.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Config pointing at the given Supabase instance with billing defaults.
    pub fn with_supabase(url: &str, anon_key: &str, jwt_secret: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            supabase_anon_key: anon_key.to_string(),
            supabase_jwt_secret: jwt_secret.to_string(),
            billing_company: DEFAULT_BILLING_COMPANY.to_string(),
            walk_in_customer: DEFAULT_WALK_IN_CUSTOMER.to_string(),
            mode_of_payment: DEFAULT_MODE_OF_PAYMENT.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_billing_configured(&self) -> bool {
        !self.billing_company.is_empty()
            && !self.walk_in_customer.is_empty()
            && !self.mode_of_payment.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_supabase_uses_billing_defaults() {
        let config = AppConfig::with_supabase("http://localhost:54321", "anon", "secret");

        assert!(config.is_configured());
        assert!(config.is_billing_configured());
        assert_eq!(config.billing_company, "Parvati");
        assert_eq!(config.walk_in_customer, "Walk-in Customer");
        assert_eq!(config.mode_of_payment, "Cash");
    }

    #[test]
    fn test_missing_supabase_url_is_not_configured() {
        let config = AppConfig::with_supabase("", "anon", "secret");
        assert!(!config.is_configured());
    }
}
