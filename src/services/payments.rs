use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus, PaymentStatus};
use crate::entities::webhook_event;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::gateway::{verify_payment_signature, verify_webhook_signature, PaymentGateway};

/// Payment orchestration: gateway order creation, checkout callback
/// verification, and webhook reconciliation.
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    gateway: Arc<dyn PaymentGateway>,
    event_sender: EventSender,
    key_id: String,
    key_secret: String,
    webhook_secret: Option<String>,
    currency: String,
}

/// Response for checkout initialization. `key_id` is the public half of the
/// gateway credentials, safe to hand to the client.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Outcome of a webhook delivery.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Ignored,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: WebhookPaymentWrapper,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentWrapper {
    entity: WebhookPaymentEntity,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentEntity {
    id: String,
    order_id: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Converts a major-unit amount to minor units (rupees to paise), rounding
/// half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            ServiceError::InternalError(format!("amount {} out of range for minor units", amount))
        })
}

impl PaymentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: EventSender,
        key_id: String,
        key_secret: String,
        webhook_secret: Option<String>,
        currency: String,
    ) -> Self {
        Self {
            db,
            gateway,
            event_sender,
            key_id,
            key_secret,
            webhook_secret,
            currency,
        }
    }

    /// Creates a gateway order. With a booking id the order is minted for
    /// the stored stay price and recorded on the booking; a client-supplied
    /// amount must agree with that price. Without a booking id the amount is
    /// required and the order is free-standing.
    #[instrument(skip(self))]
    pub async fn create_payment_order(
        &self,
        user_id: Uuid,
        is_admin: bool,
        amount_rupees: Option<Decimal>,
        booking_id: Option<Uuid>,
    ) -> Result<PaymentOrderResponse, ServiceError> {
        if let Some(amount) = amount_rupees {
            if amount <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "amount_rupees must be positive".to_string(),
                ));
            }
        }

        let Some(booking_id) = booking_id else {
            let amount = amount_rupees.ok_or_else(|| {
                ServiceError::ValidationError(
                    "amount_rupees is required without a booking_id".to_string(),
                )
            })?;
            let amount = to_minor_units(amount)?;
            let receipt = format!("rcpt_{}", Utc::now().timestamp_millis());
            let order = self
                .gateway
                .create_order(amount, &self.currency, &receipt)
                .await?;
            info!(order_id = %order.id, amount, "created free-standing payment order");
            return Ok(PaymentOrderResponse {
                order_id: order.id,
                amount: order.amount,
                currency: order.currency,
                key_id: self.key_id.clone(),
                booking_id: None,
            });
        };

        let current = self.load_booking(booking_id).await?;
        if !is_admin && current.user_id != user_id {
            return Err(ServiceError::NotFound(format!(
                "Booking {} not found",
                booking_id
            )));
        }
        if current.booking_status() != Some(BookingStatus::Confirmed) {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot take payment for a booking in status {}",
                current.status
            )));
        }
        // The stored price is authoritative; a client amount must match it.
        if let Some(amount) = amount_rupees {
            if amount != current.price {
                return Err(ServiceError::ValidationError(format!(
                    "amount_rupees {} does not match the booking price {}",
                    amount, current.price
                )));
            }
        }

        let amount = to_minor_units(current.price)?;
        let receipt = format!("booking_{}", booking_id.simple());
        let order = self
            .gateway
            .create_order(amount, &self.currency, &receipt)
            .await?;

        let mut record: booking::ActiveModel = current.into();
        record.payment_order_id = Set(Some(order.id.clone()));
        record.updated_at = Set(Some(Utc::now()));
        record.update(self.db.as_ref()).await?;

        info!(order_id = %order.id, amount, "created payment order");
        self.event_sender
            .send(Event::PaymentOrderCreated {
                booking_id,
                gateway_order_id: order.id.clone(),
                amount_minor: amount,
            })
            .await;

        Ok(PaymentOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
            booking_id: Some(booking_id),
        })
    }

    /// Verifies the checkout callback signature and marks the booking paid.
    /// Replayed callbacks for an already-captured payment succeed without a
    /// second write.
    #[instrument(skip(self, request))]
    pub async fn confirm_payment(
        &self,
        user_id: Uuid,
        is_admin: bool,
        request: VerifyPaymentRequest,
    ) -> Result<booking::Model, ServiceError> {
        let valid = verify_payment_signature(
            &self.key_secret,
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
        )?;
        if !valid {
            warn!(order_id = %request.razorpay_order_id, "payment signature mismatch");
            return Err(ServiceError::SignatureInvalid);
        }

        let current = booking::Entity::find()
            .filter(booking::Column::PaymentOrderId.eq(request.razorpay_order_id.clone()))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No booking for payment order {}",
                    request.razorpay_order_id
                ))
            })?;
        if !is_admin && current.user_id != user_id {
            return Err(ServiceError::NotFound(format!(
                "No booking for payment order {}",
                request.razorpay_order_id
            )));
        }

        self.mark_paid(self.db.as_ref(), current, &request.razorpay_payment_id)
            .await
    }

    /// Applies a gateway webhook. The signature covers the raw body bytes;
    /// verification happens before any parsing. Redeliveries are absorbed by
    /// the processed-event ledger.
    #[instrument(skip(self, body, signature))]
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
        event_id: Option<&str>,
    ) -> Result<WebhookOutcome, ServiceError> {
        let secret = self.webhook_secret.as_deref().unwrap_or(&self.key_secret);
        if !verify_webhook_signature(secret, body, signature)? {
            warn!("webhook signature mismatch");
            return Err(ServiceError::SignatureInvalid);
        }

        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| ServiceError::BadRequest(format!("Malformed webhook payload: {}", e)))?;
        let payment = &envelope.payload.payment.entity;

        // Without a delivery id from the gateway, dedup on event type plus
        // payment id; a retry of the same delivery hits the same key.
        let dedup_key = match event_id {
            Some(id) => id.to_string(),
            None => format!("{}:{}", envelope.event, payment.id),
        };

        let current = booking::Entity::find()
            .filter(booking::Column::PaymentOrderId.eq(payment.order_id.clone()))
            .one(self.db.as_ref())
            .await?;
        let Some(current) = current else {
            // Order unknown to us; acknowledge so the gateway stops retrying.
            warn!(order_id = %payment.order_id, "webhook for unknown payment order");
            return Ok(WebhookOutcome::Ignored);
        };

        // The ledger insert and the booking update commit together, so a
        // delivery that fails mid-way can be retried from scratch.
        let txn = self.db.begin().await?;
        let inserted = webhook_event::Entity::insert(webhook_event::ActiveModel {
            event_id: Set(dedup_key.clone()),
            event_type: Set(envelope.event.clone()),
            booking_id: Set(Some(current.id)),
            received_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(webhook_event::Column::EventId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
        if inserted == 0 {
            info!(%dedup_key, "duplicate webhook delivery");
            return Ok(WebhookOutcome::Duplicate);
        }

        match envelope.event.as_str() {
            "payment.captured" => {
                let booking_id = current.id;
                self.mark_paid(&txn, current, &payment.id).await?;
                txn.commit().await?;
                info!(%booking_id, payment_id = %payment.id, "webhook captured payment");
                Ok(WebhookOutcome::Processed)
            }
            "payment.failed" => {
                txn.commit().await?;
                self.event_sender
                    .send(Event::PaymentFailed {
                        booking_id: current.id,
                        reason: payment.error_description.clone(),
                    })
                    .await;
                Ok(WebhookOutcome::Processed)
            }
            other => {
                txn.commit().await?;
                info!(event = other, "ignoring unhandled webhook event type");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Stamps the gateway payment onto a booking as a single conditional
    /// update, filtered to Confirmed bookings with no payment recorded yet.
    /// A replay that carries the payment id already on the row is a no-op
    /// success; anything else that lost the filter is a conflict.
    async fn mark_paid<C: ConnectionTrait>(
        &self,
        conn: &C,
        current: booking::Model,
        payment_id: &str,
    ) -> Result<booking::Model, ServiceError> {
        if let Some(existing) = current.payment_id.as_deref() {
            if existing == payment_id {
                return Ok(current);
            }
            return Err(ServiceError::Conflict(
                "Booking already carries a different payment".to_string(),
            ));
        }
        if current.booking_status() != Some(BookingStatus::Confirmed) {
            return Err(ServiceError::Conflict(format!(
                "Cannot record a payment on a booking in status {}",
                current.status
            )));
        }

        let now = Utc::now();
        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::PaymentStatus,
                Expr::value(PaymentStatus::Paid.to_string()),
            )
            .col_expr(
                booking::Column::PaymentId,
                Expr::value(Some(payment_id.to_string())),
            )
            .col_expr(booking::Column::PaidAt, Expr::value(now))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .col_expr(
                booking::Column::Version,
                Expr::col(booking::Column::Version).add(1),
            )
            .filter(booking::Column::Id.eq(current.id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.to_string()))
            .filter(booking::Column::PaymentId.is_null())
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            // Lost a race; re-read to see whether it was the same payment.
            let after = Self::load_booking_on(conn, current.id).await?;
            if after.payment_id.as_deref() == Some(payment_id) {
                return Ok(after);
            }
            return Err(ServiceError::Conflict(
                "Payment state changed concurrently".to_string(),
            ));
        }

        self.event_sender
            .send(Event::PaymentCaptured {
                booking_id: current.id,
                payment_id: payment_id.to_string(),
            })
            .await;

        Self::load_booking_on(conn, current.id).await
    }

    async fn load_booking(&self, booking_id: Uuid) -> Result<booking::Model, ServiceError> {
        Self::load_booking_on(self.db.as_ref(), booking_id).await
    }

    async fn load_booking_on<C: ConnectionTrait>(
        conn: &C,
        booking_id: Uuid,
    ) -> Result<booking::Model, ServiceError> {
        booking::Entity::find_by_id(booking_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_id)))
    }
}
