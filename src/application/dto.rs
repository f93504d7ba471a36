use crate::domain::value_objects::{PaymentAction, PaymentMethod};
use crate::ports::gateway_port::{CustomerDetails, ProductLine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Checkout initiation request: the cart snapshot the payment intent is
/// built from.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: i64,

    /// ISO currency code of the cart
    pub currency: String,

    /// Cart total
    pub amount: Decimal,

    pub payment_method: PaymentMethod,

    pub customer: CustomerDetails,

    #[serde(default)]
    pub products: Vec<ProductLine>,
}

/// Where to send the shopper.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: Uuid,
    pub redirect_url: String,
}

/// Merchant-initiated payment action on an order.
#[derive(Debug, Deserialize)]
pub struct PaymentActionRequest {
    pub action: PaymentAction,

    /// Refund amount, required for refunds
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Order-status hook payload.
#[derive(Debug, Deserialize)]
pub struct OrderStatusHookRequest {
    pub order_id: i64,
    pub new_status_id: i32,
}

/// Refund-slip hook payload.
#[derive(Debug, Deserialize)]
pub struct RefundSlipHookRequest {
    pub order_id: i64,

    /// Refunded amount per order line
    #[serde(default)]
    pub product_amounts: Vec<Decimal>,

    #[serde(default)]
    pub shipping_amount: Decimal,
}

impl RefundSlipHookRequest {
    /// Slip total: refunded line items plus shipping.
    pub fn total(&self) -> Decimal {
        self.product_amounts.iter().copied().sum::<Decimal>() + self.shipping_amount
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_refund_slip_total_includes_shipping() {
        let request = RefundSlipHookRequest {
            order_id: 1,
            product_amounts: vec![dec!(100), dec!(150)],
            shipping_amount: dec!(25),
        };

        assert_eq!(request.total(), dec!(275));
    }

    #[test]
    fn test_refund_slip_defaults_to_zero() {
        let request: RefundSlipHookRequest =
            serde_json::from_value(serde_json::json!({ "order_id": 1 })).unwrap();

        assert_eq!(request.total(), Decimal::ZERO);
    }
}
