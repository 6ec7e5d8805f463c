use std::sync::Arc;

use crate::services::{
    BookingService, CatalogService, DashboardService, PaymentService, ProfileService,
    SettingsService,
};

pub mod admin;
pub mod bookings;
pub mod common;
pub mod hotels;
pub mod payment_webhooks;
pub mod payments;
pub mod profile;

/// Service container carried in application state.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub bookings: Arc<BookingService>,
    pub payments: Arc<PaymentService>,
    pub profiles: Arc<ProfileService>,
    pub dashboard: Arc<DashboardService>,
    pub settings: Arc<SettingsService>,
}
