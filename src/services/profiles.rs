use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{booking, profile, user};
use crate::errors::ServiceError;

/// Traveller profile reads and updates. Profile rows are created on first
/// touch rather than at registration.
pub struct ProfileService {
    db: Arc<DatabaseConnection>,
}

/// Combined user + profile view returned by the profile endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub preferences: serde_json::Value,
    pub loyalty_points: i64,
    pub total_bookings: u64,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

impl ProfileService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<ProfileView, ServiceError> {
        let account = self.load_user(user_id).await?;
        let profile = self.ensure_profile(user_id).await?;
        let total_bookings = self.count_bookings(user_id).await?;
        Ok(Self::view(account, profile, total_bookings))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<ProfileView, ServiceError> {
        request.validate()?;
        let account = self.load_user(user_id).await?;
        let existing = self.ensure_profile(user_id).await?;
        let now = Utc::now();

        let account = if let Some(name) = request.name {
            let mut record: user::ActiveModel = account.into();
            record.name = Set(name);
            record.updated_at = Set(now);
            record.update(self.db.as_ref()).await?
        } else {
            account
        };

        let mut record: profile::ActiveModel = existing.into();
        if let Some(phone) = request.phone {
            record.phone = Set(Some(phone));
        }
        if let Some(avatar) = request.avatar {
            record.avatar = Set(Some(avatar));
        }
        if let Some(dob) = request.date_of_birth {
            record.date_of_birth = Set(Some(dob));
        }
        if let Some(address) = request.address {
            record.address = Set(Some(address));
        }
        if let Some(preferences) = request.preferences {
            record.preferences = Set(preferences);
        }
        record.updated_at = Set(now);
        let updated = record.update(self.db.as_ref()).await?;

        let total_bookings = self.count_bookings(user_id).await?;
        Ok(Self::view(account, updated, total_bookings))
    }

    /// Replaces the free-form preferences document wholesale.
    #[instrument(skip(self, preferences))]
    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: serde_json::Value,
    ) -> Result<ProfileView, ServiceError> {
        let account = self.load_user(user_id).await?;
        let existing = self.ensure_profile(user_id).await?;

        let mut record: profile::ActiveModel = existing.into();
        record.preferences = Set(preferences);
        record.updated_at = Set(Utc::now());
        let updated = record.update(self.db.as_ref()).await?;

        let total_bookings = self.count_bookings(user_id).await?;
        Ok(Self::view(account, updated, total_bookings))
    }

    pub async fn loyalty_points(&self, user_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.ensure_profile(user_id).await?.loyalty_points)
    }

    async fn count_bookings(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await?)
    }

    async fn load_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    async fn ensure_profile(&self, user_id: Uuid) -> Result<profile::Model, ServiceError> {
        if let Some(existing) = profile::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
        {
            return Ok(existing);
        }
        let now = Utc::now();
        let created = profile::ActiveModel {
            user_id: Set(user_id),
            phone: Set(None),
            avatar: Set(None),
            date_of_birth: Set(None),
            address: Set(None),
            preferences: Set(serde_json::json!({})),
            loyalty_points: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(created)
    }

    fn view(account: user::Model, profile: profile::Model, total_bookings: u64) -> ProfileView {
        ProfileView {
            user_id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            phone: profile.phone,
            avatar: profile.avatar,
            date_of_birth: profile.date_of_birth,
            address: profile.address,
            preferences: profile.preferences,
            loyalty_points: profile.loyalty_points,
            total_bookings,
            member_since: account.created_at,
        }
    }
}
