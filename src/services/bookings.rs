use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::booking::{self, BookingStatus, PaymentStatus};
use crate::entities::{hotel, profile, setting};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// One loyalty point per ten rupees spent.
const LOYALTY_DIVISOR: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Booking ledger operations: creation with loyalty credit, listing, and
/// cancellation under the cancellation-window policy.
pub struct BookingService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    default_cancellation_window: Duration,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub hotel_id: Uuid,
    #[validate(length(min = 1))]
    pub room_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[validate(range(min = 1, max = 20))]
    pub guests: i32,
    pub special_requests: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl BookingListQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }
}

/// Whole nights covered by the stay, any partial night rounded up.
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    let seconds = (check_out - check_in).num_seconds();
    (seconds + 86_399) / 86_400
}

/// Loyalty points for a paid amount: one point per ten currency units,
/// rounded down.
pub fn loyalty_points_for(price: Decimal) -> i64 {
    (price / LOYALTY_DIVISOR).floor().to_i64().unwrap_or(0)
}

impl BookingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        cancellation_window_hours: i64,
    ) -> Self {
        Self {
            db,
            event_sender,
            default_cancellation_window: Duration::hours(cancellation_window_hours),
        }
    }

    /// Live cancellation window. Admins adjust it through the settings row;
    /// the configured default applies until that row exists.
    async fn cancellation_window(&self) -> Result<Duration, ServiceError> {
        let hours = setting::Entity::find_by_id(setting::SETTINGS_ROW_ID)
            .one(self.db.as_ref())
            .await?
            .map(|row| row.cancellation_window_hours);
        Ok(match hours {
            Some(hours) => Duration::hours(hours),
            None => self.default_cancellation_window,
        })
    }

    /// Creates a booking. The booking row and the loyalty credit commit in
    /// one transaction; a failure on either side leaves no partial state.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<booking::Model, ServiceError> {
        request.validate()?;
        if request.check_out <= request.check_in {
            return Err(ServiceError::ValidationError(
                "check_out must be after check_in".to_string(),
            ));
        }

        let hotel = hotel::Entity::find_by_id(request.hotel_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Hotel {} not found", request.hotel_id))
            })?;

        let room = hotel.find_room(&request.room_id).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Room {} not found in hotel {}",
                request.room_id, hotel.id
            ))
        })?;
        if !room.available {
            return Err(ServiceError::InvalidOperation(
                "Room is not available for booking".to_string(),
            ));
        }
        if request.guests > room.max_guests {
            return Err(ServiceError::ValidationError(format!(
                "Room {} sleeps at most {} guests",
                room.id, room.max_guests
            )));
        }

        let nights = nights_between(request.check_in, request.check_out);
        // Price is fixed here; later rate changes never touch this booking.
        let price = room.price * Decimal::from(nights);
        let points = loyalty_points_for(price);
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let saved = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            hotel_id: Set(hotel.id),
            room_id: Set(room.id.clone()),
            hotel_name: Set(hotel.name.clone()),
            hotel_image: Set(hotel.primary_image()),
            location: Set(hotel.display_location()),
            room_type: Set(room.room_type.clone()),
            check_in: Set(request.check_in),
            check_out: Set(request.check_out),
            guests: Set(request.guests),
            price: Set(price),
            // Checkout happens client-side before the booking is submitted,
            // so a new booking is already paid. Gateway details land later
            // via verify or the webhook.
            status: Set(BookingStatus::Confirmed.to_string()),
            payment_status: Set(PaymentStatus::Paid.to_string()),
            payment_order_id: Set(None),
            payment_id: Set(None),
            paid_at: Set(None),
            special_requests: Set(request.special_requests),
            cancellation_reason: Set(None),
            cancelled_at: Set(None),
            booking_date: Set(now),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        credit_loyalty_points(&txn, user_id, points).await?;

        txn.commit().await?;

        info!(booking_id = %saved.id, nights, %price, points, "created booking");
        self.event_sender
            .send(Event::BookingCreated {
                booking_id: saved.id,
                user_id,
                hotel_id: hotel.id,
                price,
                loyalty_points_awarded: points,
            })
            .await;

        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list_user_bookings(
        &self,
        user_id: Uuid,
        query: &BookingListQuery,
    ) -> Result<(Vec<booking::Model>, u64), ServiceError> {
        let mut select = booking::Entity::find().filter(booking::Column::UserId.eq(user_id));
        if let Some(status) = &query.status {
            let parsed: BookingStatus = status.parse().map_err(|_| {
                ServiceError::ValidationError(format!("Unknown booking status: {}", status))
            })?;
            select = select.filter(booking::Column::Status.eq(parsed.to_string()));
        }

        let paginator = select
            .order_by_desc(booking::Column::BookingDate)
            .paginate(self.db.as_ref(), query.per_page());
        let total = paginator.num_items().await?;
        let bookings = paginator.fetch_page(query.page() - 1).await?;
        Ok((bookings, total))
    }

    /// Fetches a booking, enforcing ownership unless the caller is an admin.
    pub async fn get_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<booking::Model, ServiceError> {
        let found = booking::Entity::find_by_id(booking_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_id)))?;
        if !is_admin && found.user_id != user_id {
            // Hide other users' bookings entirely.
            return Err(ServiceError::NotFound(format!(
                "Booking {} not found",
                booking_id
            )));
        }
        Ok(found)
    }

    /// Cancels a confirmed booking. The state transition is a single
    /// conditional update; a concurrent transition makes it match zero rows
    /// and the call fails with a conflict instead of double-applying.
    ///
    /// Admins may cancel any booking and are exempt from the window policy.
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
        reason: Option<String>,
    ) -> Result<booking::Model, ServiceError> {
        let current = self.get_booking(booking_id, user_id, is_admin).await?;

        match current.booking_status() {
            Some(BookingStatus::Confirmed) => {}
            Some(BookingStatus::Cancelled) => {
                return Err(ServiceError::InvalidOperation(
                    "Booking is already cancelled".to_string(),
                ));
            }
            _ => {
                return Err(ServiceError::InvalidOperation(format!(
                    "Cannot cancel a booking in status {}",
                    current.status
                )));
            }
        }

        let now = Utc::now();
        let window = self.cancellation_window().await?;
        if !is_admin && now > current.check_in - window {
            return Err(ServiceError::PolicyViolation(format!(
                "Bookings can only be cancelled up to {} hours before check-in",
                window.num_hours()
            )));
        }

        // Cancellation always refunds the stay, so the payment state flips
        // to Refunded alongside it.
        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.to_string()),
            )
            .col_expr(
                booking::Column::PaymentStatus,
                Expr::value(PaymentStatus::Refunded.to_string()),
            )
            .col_expr(booking::Column::CancellationReason, Expr::value(reason.clone()))
            .col_expr(booking::Column::CancelledAt, Expr::value(now))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .col_expr(
                booking::Column::Version,
                Expr::col(booking::Column::Version).add(1),
            )
            .filter(booking::Column::Id.eq(booking_id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.to_string()))
            .filter(booking::Column::Version.eq(current.version))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            warn!(%booking_id, "cancellation lost a concurrent state transition");
            return Err(ServiceError::Conflict(
                "Booking was modified concurrently, please retry".to_string(),
            ));
        }

        self.event_sender
            .send(Event::BookingCancelled { booking_id, reason })
            .await;

        self.get_booking(booking_id, user_id, is_admin).await
    }

    /// Admin listing across all users.
    #[instrument(skip(self))]
    pub async fn list_all_bookings(
        &self,
        query: &BookingListQuery,
    ) -> Result<(Vec<booking::Model>, u64), ServiceError> {
        let mut select = booking::Entity::find();
        if let Some(status) = &query.status {
            let parsed: BookingStatus = status.parse().map_err(|_| {
                ServiceError::ValidationError(format!("Unknown booking status: {}", status))
            })?;
            select = select.filter(booking::Column::Status.eq(parsed.to_string()));
        }

        let paginator = select
            .order_by_desc(booking::Column::BookingDate)
            .paginate(self.db.as_ref(), query.per_page());
        let total = paginator.num_items().await?;
        let bookings = paginator.fetch_page(query.page() - 1).await?;
        Ok((bookings, total))
    }

    /// Admin status override. Skips the user-facing policy checks but still
    /// bumps the version so concurrent transitions collide.
    #[instrument(skip(self))]
    pub async fn admin_set_status(
        &self,
        booking_id: Uuid,
        new_status: &str,
        new_payment_status: Option<&str>,
    ) -> Result<booking::Model, ServiceError> {
        let parsed: BookingStatus = new_status.parse().map_err(|_| {
            ServiceError::ValidationError(format!("Unknown booking status: {}", new_status))
        })?;
        let parsed_payment: Option<PaymentStatus> = new_payment_status
            .map(|raw| {
                raw.parse().map_err(|_| {
                    ServiceError::ValidationError(format!("Unknown payment status: {}", raw))
                })
            })
            .transpose()?;
        let current = booking::Entity::find_by_id(booking_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_id)))?;

        let now = Utc::now();
        let mut update = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(parsed.to_string()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now));
        if let Some(payment) = parsed_payment {
            update = update.col_expr(
                booking::Column::PaymentStatus,
                Expr::value(payment.to_string()),
            );
        }
        let result = update
            .col_expr(
                booking::Column::Version,
                Expr::col(booking::Column::Version).add(1),
            )
            .filter(booking::Column::Id.eq(booking_id))
            .filter(booking::Column::Version.eq(current.version))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(
                "Booking was modified concurrently, please retry".to_string(),
            ));
        }

        self.event_sender
            .send(Event::BookingStatusChanged {
                booking_id,
                old_status: current.status,
                new_status: parsed.to_string(),
            })
            .await;

        booking::Entity::find_by_id(booking_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_id)))
    }

    /// Admin hard delete. Loyalty credits already granted are left alone.
    #[instrument(skip(self))]
    pub async fn delete_booking(&self, booking_id: Uuid) -> Result<(), ServiceError> {
        let result = booking::Entity::delete_by_id(booking_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Booking {} not found",
                booking_id
            )));
        }
        info!(%booking_id, "deleted booking");
        Ok(())
    }
}

/// Adds points to a user's profile, creating the profile row if this is the
/// user's first credit. Runs on the caller's transaction.
pub async fn credit_loyalty_points(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    points: i64,
) -> Result<(), ServiceError> {
    if points <= 0 {
        return Ok(());
    }
    let now = Utc::now();
    match profile::Entity::find_by_id(user_id).one(txn).await? {
        Some(existing) => {
            let balance = existing.loyalty_points + points;
            let mut record: profile::ActiveModel = existing.into();
            record.loyalty_points = Set(balance);
            record.updated_at = Set(now);
            record.update(txn).await?;
        }
        None => {
            profile::ActiveModel {
                user_id: Set(user_id),
                phone: Set(None),
                avatar: Set(None),
                date_of_birth: Set(None),
                address: Set(None),
                preferences: Set(serde_json::json!({})),
                loyalty_points: Set(points),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn exact_days_count_as_whole_nights() {
        assert_eq!(
            nights_between(at("2026-03-01T12:00:00Z"), at("2026-03-04T12:00:00Z")),
            3
        );
    }

    #[test]
    fn partial_night_rounds_up() {
        assert_eq!(
            nights_between(at("2026-03-01T14:00:00Z"), at("2026-03-02T10:00:00Z")),
            1
        );
        assert_eq!(
            nights_between(at("2026-03-01T14:00:00Z"), at("2026-03-03T10:01:00Z")),
            2
        );
    }

    #[test]
    fn loyalty_points_floor_division() {
        assert_eq!(loyalty_points_for(dec!(10500)), 1050);
        assert_eq!(loyalty_points_for(dec!(99)), 9);
        assert_eq!(loyalty_points_for(dec!(9.99)), 0);
        assert_eq!(loyalty_points_for(dec!(0)), 0);
    }
}
