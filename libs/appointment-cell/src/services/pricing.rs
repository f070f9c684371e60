// libs/appointment-cell/src/services/pricing.rs
use std::sync::Arc;

use tracing::debug;

use crate::models::AppointmentError;
use crate::services::repository::ServiceCatalog;

pub struct PricingService {
    catalog: Arc<dyn ServiceCatalog>,
}

impl PricingService {
    pub fn new(catalog: Arc<dyn ServiceCatalog>) -> Self {
        Self { catalog }
    }

    /// Configured price of `service`, or 0 when it cannot be resolved.
    pub async fn get_service_price(&self, service: Option<&str>) -> Result<f64, AppointmentError> {
        let Some(service) = service.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(0.0);
        };

        let price = self.catalog.get_service(service).await?
            .map(|service_doc| service_doc.effective_price())
            .unwrap_or(0.0);

        debug!("Price for {}: {:.2}", service, price);
        Ok(price)
    }
}
