use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityError, CreateServiceRequest, Service};

const DEFAULT_BUFFER_MINUTES: i32 = 0;
const DEFAULT_MAX_ADVANCE_BOOK_DAYS: i32 = 90;

/// Read port over the per-service booking rules (duration, buffer, horizon,
/// price). Snapshot semantics: a service handed to the engine is immutable
/// for the duration of that computation.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn get(&self, service_id: Uuid) -> Result<Service, AvailabilityError>;

    async fn list(&self, provider_id: Uuid) -> Result<Vec<Service>, AvailabilityError>;
}

/// In-memory service catalog.
#[derive(Default)]
pub struct InMemoryCatalog {
    services: RwLock<HashMap<Uuid, Service>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_service(
        &self,
        provider_id: Uuid,
        request: CreateServiceRequest,
    ) -> Result<Service, AvailabilityError> {
        if request.name.trim().is_empty() {
            return Err(AvailabilityError::Validation(
                "Service name cannot be empty".to_string(),
            ));
        }
        if request.duration_minutes <= 0 {
            return Err(AvailabilityError::Validation(
                "Service duration must be positive".to_string(),
            ));
        }
        let buffer_minutes = request.buffer_minutes.unwrap_or(DEFAULT_BUFFER_MINUTES);
        if buffer_minutes < 0 {
            return Err(AvailabilityError::Validation(
                "Buffer time cannot be negative".to_string(),
            ));
        }
        let max_advance_book_days = request
            .max_advance_book_days
            .unwrap_or(DEFAULT_MAX_ADVANCE_BOOK_DAYS);
        if max_advance_book_days < 1 {
            return Err(AvailabilityError::Validation(
                "Advance-booking horizon must be at least one day".to_string(),
            ));
        }
        if request.price < 0.0 {
            return Err(AvailabilityError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }

        let service = Service {
            id: Uuid::new_v4(),
            provider_id,
            name: request.name,
            duration_minutes: request.duration_minutes,
            buffer_minutes,
            max_advance_book_days,
            price: request.price,
            created_at: Utc::now(),
        };

        let mut services = self.services.write().await;
        services.insert(service.id, service.clone());
        debug!("Created service {} for provider {}", service.id, provider_id);
        Ok(service)
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryCatalog {
    async fn get(&self, service_id: Uuid) -> Result<Service, AvailabilityError> {
        let services = self.services.read().await;
        services
            .get(&service_id)
            .cloned()
            .ok_or(AvailabilityError::ServiceNotFound)
    }

    async fn list(&self, provider_id: Uuid) -> Result<Vec<Service>, AvailabilityError> {
        let services = self.services.read().await;
        let mut listed: Vec<Service> = services
            .values()
            .filter(|service| service.provider_id == provider_id)
            .cloned()
            .collect();
        listed.sort_by_key(|service| service.created_at);
        Ok(listed)
    }
}
