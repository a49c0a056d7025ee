use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{BookingRepository, NotificationService, ServiceRepository};
use crate::domain::services::availability::AvailabilityResolver;
use crate::domain::services::lifecycle::BookingLifecycle;
use crate::infra::cache::AvailabilityCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub notifier: Arc<dyn NotificationService>,
    pub cache: AvailabilityCache,
    pub resolver: Arc<AvailabilityResolver>,
    pub lifecycle: Arc<BookingLifecycle>,
}
