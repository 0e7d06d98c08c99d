//! Order types and fulfillment transitions.
//!
//! An order's core fields are immutable after placement. Only `status`,
//! `payment_status`, and `delivered_content` move, and only through the
//! transitions defined here: `pending -> completed` and
//! `pending -> cancelled`. Both outcomes are terminal.

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Sentinel transaction ID for fully-discounted orders.
pub const FREE_TRANSACTION_ID: &str = "FREE";

/// Sentinel payment method for fully-discounted orders.
pub const FREE_PAYMENT_METHOD: &str = "Free Checkout";

/// Placeholder for fields that don't apply to an order.
pub const NOT_APPLICABLE: &str = "N/A";

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting admin verification.
    #[default]
    Pending,
    /// Under manual review.
    Processing,
    /// Verified and delivered.
    Completed,
    /// Declined or cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Payment verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment asserted but not verified.
    #[default]
    Unpaid,
    /// Verified by an admin.
    Paid,
    /// Rejected by an admin.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Secret delivery content attached at completion.
///
/// All fields are empty until the order completes, and the buyer never
/// sees them before that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliveredContent {
    /// Delivered account email.
    pub account_email: String,
    /// Delivered account password.
    pub account_password: String,
    /// Download or access link.
    pub download_link: String,
    /// Free-form access notes.
    pub access_notes: String,
}

impl DeliveredContent {
    /// Check whether any delivery field carries content.
    pub fn has_any(&self) -> bool {
        !self.account_email.trim().is_empty()
            || !self.account_password.trim().is_empty()
            || !self.download_link.trim().is_empty()
            || !self.access_notes.trim().is_empty()
    }
}

/// One product entry on an order: a snapshot, never a live join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Product reference.
    pub product: ProductId,
    /// Quantity purchased.
    pub quantity: i64,
    /// Per-unit price charged, copied verbatim from the cart line.
    pub price: Money,
    /// Product title at placement time.
    pub title: String,
    /// Plan validity label at placement time.
    pub variant: String,
}

impl OrderLine {
    /// Project a cart line into an order line.
    pub fn from_cart_line(line: &LineItem) -> Self {
        Self {
            product: line.key.product.clone(),
            quantity: line.quantity,
            price: line.unit_price,
            title: line.title.clone(),
            variant: line.validity.clone(),
        }
    }

    /// Line total (price times quantity).
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// The buyer.
    pub user: UserId,
    /// Product snapshots.
    pub products: Vec<OrderLine>,
    /// Buyer-asserted transaction reference.
    pub transaction_id: String,
    /// Buyer-asserted sender wallet/phone number.
    pub sender_number: String,
    /// Payment method the buyer claims to have used.
    pub payment_method: String,
    /// Final payable total (subtotal minus discount).
    pub amount: Money,
    /// Discount applied at placement.
    pub discount_amount: Money,
    /// Coupon code attached, if any.
    pub coupon_code: Option<String>,
    /// Payment verification status.
    pub payment_status: PaymentStatus,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Delivery secrets, empty until completion.
    pub delivered_content: DeliveredContent,
    /// Unix timestamp of placement.
    pub created_at: i64,
    /// Unix timestamp of last transition.
    pub updated_at: i64,
}

impl Order {
    /// Generate a human-readable order number, unique within the
    /// process even for orders placed in the same second.
    pub fn generate_order_number() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("ORD-{}-{:04x}", ts, counter & 0xFFFF)
    }

    /// Check if this order was fully discounted at placement.
    pub fn is_free(&self) -> bool {
        self.amount.is_zero()
    }

    /// Total item count across all lines.
    pub fn item_count(&self) -> i64 {
        self.products.iter().map(|l| l.quantity).sum()
    }

    /// Delivery content as the buyer may see it: present only once the
    /// order is completed.
    pub fn visible_delivery(&self) -> Option<&DeliveredContent> {
        if self.status == OrderStatus::Completed {
            Some(&self.delivered_content)
        } else {
            None
        }
    }

    /// Complete the order, attaching delivery content.
    ///
    /// Requires the order to still be pending and the content to carry
    /// at least one non-empty field. Sets `completed` + `paid`.
    pub fn complete(&mut self, content: DeliveredContent) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Pending {
            return Err(CommerceError::OrderNotPending {
                status: self.status.as_str(),
            });
        }
        if !content.has_any() {
            return Err(CommerceError::MissingDeliveredContent);
        }
        self.delivered_content = content;
        self.status = OrderStatus::Completed;
        self.payment_status = PaymentStatus::Paid;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Decline the order. Maps the admin's "declined" outcome onto the
    /// terminal `cancelled` status with `payment_status = failed`;
    /// delivery content stays empty.
    pub fn decline(&mut self) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Pending {
            return Err(CommerceError::OrderNotPending {
                status: self.status.as_str(),
            });
        }
        self.status = OrderStatus::Cancelled;
        self.payment_status = PaymentStatus::Failed;
        self.updated_at = current_timestamp();
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn pending_order() -> Order {
        Order {
            id: OrderId::generate(),
            order_number: Order::generate_order_number(),
            user: UserId::new("u1"),
            products: vec![OrderLine {
                product: ProductId::new("p1"),
                quantity: 1,
                price: bdt(50000),
                title: "Course".to_string(),
                variant: "Standard".to_string(),
            }],
            transaction_id: "TX123".to_string(),
            sender_number: "01700000000".to_string(),
            payment_method: "bKash".to_string(),
            amount: bdt(50000),
            discount_amount: bdt(0),
            coupon_code: None,
            payment_status: PaymentStatus::Unpaid,
            status: OrderStatus::Pending,
            delivered_content: DeliveredContent::default(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn delivery() -> DeliveredContent {
        DeliveredContent {
            download_link: "https://example.com/dl".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_numbers_unique_within_a_second() {
        let a = Order::generate_order_number();
        let b = Order::generate_order_number();
        assert_ne!(a, b);
    }

    #[test]
    fn test_delivery_hidden_while_pending() {
        let order = pending_order();
        assert!(order.visible_delivery().is_none());
    }

    #[test]
    fn test_complete_attaches_delivery() {
        let mut order = pending_order();
        order.complete(delivery()).unwrap();

        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.visible_delivery().is_some());
    }

    #[test]
    fn test_complete_requires_content() {
        let mut order = pending_order();
        let err = order.complete(DeliveredContent::default()).unwrap_err();
        assert!(matches!(err, CommerceError::MissingDeliveredContent));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_decline_is_terminal_failure() {
        let mut order = pending_order();
        order.decline().unwrap();

        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert!(order.visible_delivery().is_none());
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        let mut order = pending_order();
        order.complete(delivery()).unwrap();

        assert!(matches!(
            order.complete(delivery()),
            Err(CommerceError::OrderNotPending { status: "completed" })
        ));
        assert!(matches!(
            order.decline(),
            Err(CommerceError::OrderNotPending { status: "completed" })
        ));

        let mut declined = pending_order();
        declined.decline().unwrap();
        assert!(declined.complete(delivery()).is_err());
    }
}
