pub mod bookings;
pub mod catalog;
pub mod dashboard;
pub mod payments;
pub mod profiles;
pub mod settings;

pub use bookings::BookingService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use payments::PaymentService;
pub use profiles::ProfileService;
pub use settings::SettingsService;
