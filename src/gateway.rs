use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tracing::{error, instrument};

use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

/// An order created on the payment gateway. Amounts are in minor currency
/// units (paise for INR).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub status: String,
}

/// Payment gateway seam. Handlers and services hold this behind a trait
/// object so tests can substitute a fake without touching the network.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order for the given amount in minor units.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ServiceError>;
}

/// Razorpay Orders API client.
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
    receipt: Option<String>,
    status: String,
}

impl RazorpayGateway {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build http client: {}", e))
            })?;
        Ok(Self {
            client,
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self), fields(amount_minor, currency))]
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ServiceError> {
        let url = format!("{}/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| {
                error!("gateway request failed: {}", e);
                ServiceError::ExternalServiceError(format!("gateway request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "gateway rejected order creation");
            return Err(ServiceError::ExternalServiceError(format!(
                "gateway returned {}",
                status
            )));
        }

        let order: CreateOrderResponse = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("invalid gateway response: {}", e))
        })?;

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt.unwrap_or_else(|| receipt.to_string()),
            status: order.status,
        })
    }
}

fn hmac_hex(secret: &str, message: &[u8]) -> Result<String, ServiceError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ServiceError::InternalError("invalid hmac key".to_string()))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

/// Checks the checkout callback signature: HMAC-SHA256 over
/// `"<order_id>|<payment_id>"` keyed with the API secret.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<bool, ServiceError> {
    let expected = hmac_hex(secret, format!("{}|{}", order_id, payment_id).as_bytes())?;
    Ok(constant_time_eq(&expected, signature))
}

/// Checks a webhook signature against the raw request body. The body must be
/// the exact bytes received, before any JSON parsing.
pub fn verify_webhook_signature(
    secret: &str,
    payload: &[u8],
    signature: &str,
) -> Result<bool, ServiceError> {
    let expected = hmac_hex(secret, payload)?;
    Ok(constant_time_eq(&expected, signature))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn sign(secret: &str, message: &[u8]) -> String {
        hmac_hex(secret, message).unwrap()
    }

    #[test]
    fn payment_signature_accepts_matching_hmac() {
        let secret = "test_secret";
        let sig = sign(secret, b"order_abc|pay_xyz");
        assert!(verify_payment_signature(secret, "order_abc", "pay_xyz", &sig).unwrap());
    }

    #[test]
    fn payment_signature_rejects_tampered_ids() {
        let secret = "test_secret";
        let sig = sign(secret, b"order_abc|pay_xyz");
        assert!(!verify_payment_signature(secret, "order_abc", "pay_other", &sig).unwrap());
    }

    #[test]
    fn webhook_signature_is_over_raw_bytes() {
        let secret = "whsec";
        let body = br#"{"event":"payment.captured","payload":{}}"#;
        let sig = sign(secret, body);
        assert!(verify_webhook_signature(secret, body, &sig).unwrap());

        // Same JSON with different whitespace must not verify.
        let reformatted = br#"{ "event": "payment.captured", "payload": {} }"#;
        assert!(!verify_webhook_signature(secret, reformatted, &sig).unwrap());
    }

    #[test]
    fn length_mismatch_rejected() {
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
