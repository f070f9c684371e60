// libs/appointment-cell/src/services/error_log.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{error, warn};

use shared_database::supabase::SupabaseClient;

/// Persistent record of background failures that never reach a caller.
#[async_trait]
pub trait ErrorLogSink: Send + Sync {
    async fn log_error(&self, title: &str, message: &str);
}

/// Writes titled rows to `error_logs`.
pub struct SupabaseErrorLog {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseErrorLog {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: Option<String>) -> Self {
        Self { supabase, auth_token }
    }
}

#[async_trait]
impl ErrorLogSink for SupabaseErrorLog {
    async fn log_error(&self, title: &str, message: &str) {
        error!(title, "{}", message);

        let row = json!({
            "title": title,
            "message": message,
            "created_at": Utc::now().to_rfc3339(),
        });

        if let Err(e) = self.supabase.insert("error_logs", row, self.auth_token.as_deref()).await {
            warn!("Could not persist error log '{}': {}", title, e);
        }
    }
}
