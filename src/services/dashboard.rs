use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus, PaymentStatus};
use crate::entities::{hotel, profile, user};
use crate::errors::ServiceError;

/// Aggregated views for the traveller dashboard and the admin overview.
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDashboard {
    pub total_bookings: u64,
    /// Confirmed bookings with a check-in still in the future
    pub upcoming_stays: u64,
    pub cancelled_bookings: u64,
    pub completed_stays: u64,
    /// Sum of prices across the user's non-cancelled bookings
    pub total_spent: Decimal,
    pub loyalty_points: i64,
    pub recent_bookings: Vec<booking::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_hotels: u64,
    pub total_bookings: u64,
    pub bookings_by_status: HashMap<String, u64>,
    /// Sum of prices across paid bookings
    pub total_revenue: Decimal,
    /// Sum of prices across confirmed-but-unpaid bookings
    pub pending_revenue: Decimal,
    pub recent_bookings: Vec<booking::Model>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn user_dashboard(&self, user_id: Uuid) -> Result<UserDashboard, ServiceError> {
        let now = Utc::now();

        let total_bookings = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await?;

        let upcoming_stays = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.to_string()))
            .filter(booking::Column::CheckIn.gt(now))
            .count(self.db.as_ref())
            .await?;

        let cancelled_bookings = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::Status.eq(BookingStatus::Cancelled.to_string()))
            .count(self.db.as_ref())
            .await?;

        let completed_stays = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::Status.eq(BookingStatus::Completed.to_string()))
            .count(self.db.as_ref())
            .await?;

        let total_spent = self
            .sum_prices(
                booking::Entity::find()
                    .filter(booking::Column::UserId.eq(user_id))
                    .filter(
                        booking::Column::Status.ne(BookingStatus::Cancelled.to_string()),
                    ),
            )
            .await?;

        let loyalty_points = profile::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .map(|p| p.loyalty_points)
            .unwrap_or(0);

        let recent_bookings = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::BookingDate)
            .limit(5)
            .all(self.db.as_ref())
            .await?;

        Ok(UserDashboard {
            total_bookings,
            upcoming_stays,
            cancelled_bookings,
            completed_stays,
            total_spent,
            loyalty_points,
            recent_bookings,
        })
    }

    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ServiceError> {
        let total_users = user::Entity::find().count(self.db.as_ref()).await?;
        let total_hotels = hotel::Entity::find().count(self.db.as_ref()).await?;
        let total_bookings = booking::Entity::find().count(self.db.as_ref()).await?;

        let mut bookings_by_status = HashMap::new();
        for status in BookingStatus::iter() {
            let count = booking::Entity::find()
                .filter(booking::Column::Status.eq(status.to_string()))
                .count(self.db.as_ref())
                .await?;
            bookings_by_status.insert(status.to_string(), count);
        }

        let total_revenue = self
            .sum_prices(
                booking::Entity::find()
                    .filter(booking::Column::PaymentStatus.eq(PaymentStatus::Paid.to_string())),
            )
            .await?;

        let pending_revenue = self
            .sum_prices(
                booking::Entity::find()
                    .filter(booking::Column::Status.eq(BookingStatus::Confirmed.to_string()))
                    .filter(
                        booking::Column::PaymentStatus.eq(PaymentStatus::Pending.to_string()),
                    ),
            )
            .await?;

        let recent_bookings = booking::Entity::find()
            .order_by_desc(booking::Column::BookingDate)
            .limit(10)
            .all(self.db.as_ref())
            .await?;

        Ok(AdminDashboard {
            total_users,
            total_hotels,
            total_bookings,
            bookings_by_status,
            total_revenue,
            pending_revenue,
            recent_bookings,
        })
    }

    async fn sum_prices(
        &self,
        select: sea_orm::Select<booking::Entity>,
    ) -> Result<Decimal, ServiceError> {
        // Sum in the application; booking volumes per filter are small and
        // this keeps Decimal arithmetic exact across backends.
        let rows: Vec<Decimal> = select
            .select_only()
            .column(booking::Column::Price)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().sum())
    }
}
