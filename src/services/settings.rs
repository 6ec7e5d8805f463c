use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::setting::{self, SETTINGS_ROW_ID};
use crate::errors::ServiceError;

/// Site settings singleton. Reads fall back to defaults until an admin has
/// saved the row once.
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 120))]
    pub site_name: String,
    #[validate(email)]
    pub support_email: String,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub tax_rate: rust_decimal::Decimal,
    #[validate(range(min = 0, max = 720))]
    pub cancellation_window_hours: i64,
    pub maintenance_mode: bool,
}

fn default_settings() -> setting::Model {
    setting::Model {
        id: SETTINGS_ROW_ID,
        site_name: "Innkeeper".to_string(),
        support_email: "support@innkeeper.example".to_string(),
        currency: "INR".to_string(),
        tax_rate: rust_decimal::Decimal::ZERO,
        cancellation_window_hours: 24,
        maintenance_mode: false,
        updated_at: Utc::now(),
    }
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self) -> Result<setting::Model, ServiceError> {
        Ok(setting::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(self.db.as_ref())
            .await?
            .unwrap_or_else(default_settings))
    }

    #[instrument(skip(self, request))]
    pub async fn update_settings(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<setting::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();

        let record = setting::ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            site_name: Set(request.site_name),
            support_email: Set(request.support_email),
            currency: Set(request.currency),
            tax_rate: Set(request.tax_rate),
            cancellation_window_hours: Set(request.cancellation_window_hours),
            maintenance_mode: Set(request.maintenance_mode),
            updated_at: Set(now),
        };

        let exists = setting::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(self.db.as_ref())
            .await?
            .is_some();
        let saved = if exists {
            record.update(self.db.as_ref()).await?
        } else {
            record.insert(self.db.as_ref()).await?
        };
        info!("updated site settings");
        Ok(saved)
    }
}
