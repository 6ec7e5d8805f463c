use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Booking lifecycle state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Display, StrumEnumIter, EnumString, Serialize, Deserialize,
)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Payment state of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    /// Reference into the hotel's embedded room list; not a foreign key.
    pub room_id: String,

    // Denormalized snapshot captured at creation time; never resynced when
    // the hotel record changes later.
    pub hotel_name: String,
    pub hotel_image: String,
    pub location: String,
    pub room_type: String,

    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    /// Total price: nightly rate x nights, fixed at creation.
    pub price: Decimal,
    pub status: String,
    pub payment_status: String,

    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,

    pub special_requests: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,

    pub booking_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency guard for state transitions.
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn booking_status(&self) -> Option<BookingStatus> {
        self.status.parse().ok()
    }

    pub fn payment_state(&self) -> Option<PaymentStatus> {
        self.payment_status.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(BookingStatus::Confirmed.to_string(), "Confirmed");
        assert_eq!(
            "Cancelled".parse::<BookingStatus>().unwrap(),
            BookingStatus::Cancelled
        );
        assert_eq!(PaymentStatus::Refunded.to_string(), "Refunded");
        assert!("NotAStatus".parse::<BookingStatus>().is_err());
    }
}
