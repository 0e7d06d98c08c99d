//! Order placement and buyer-facing order views.
//!
//! Placement is the one orchestrated write of the storefront: preview
//! the coupon, find or create the buyer's account, build the order from
//! the cart snapshot, and insert it in a single all-or-nothing write.
//! No money moves here; a payable order starts `pending`/`unpaid` and
//! waits for an admin.

use crate::ApiError;
use serde::{Deserialize, Serialize};
use vend_auth::{AccountProvider, AuthSession, User};
use vend_commerce::cart::LineItem;
use vend_commerce::checkout::{
    build_order, AppliedCoupon, BuyerInfo, DeliveredContent, Order, OrderLine, OrderStatus,
    PaymentProof, PaymentStatus,
};
use vend_commerce::ids::OrderId;
use vend_commerce::money::{Currency, Money};
use vend_commerce::CommerceError;
use vend_store::{CouponRepository, OrderRepository};

/// Everything checkout submits in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    /// Buyer contact details.
    pub buyer: BuyerInfo,
    /// Payment proof; required unless the order comes out fully discounted.
    pub payment: Option<PaymentProof>,
    /// Cart lines, already priced snapshots.
    pub lines: Vec<LineItem>,
    /// Coupon code to apply, if any.
    pub coupon_code: Option<String>,
    /// Cart currency.
    pub currency: Currency,
}

/// What the buyer gets back after placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderReceipt {
    /// Order identifier.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Final payable total.
    pub amount: Money,
    /// Discount applied at placement.
    pub discount: Money,
    /// Session for the (possibly just-created) buyer account.
    pub session: AuthSession,
}

/// A buyer-facing projection of an order.
///
/// Delivery content appears only once the order is completed; before
/// that the field serializes as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub amount: Money,
    pub discount_amount: Money,
    pub coupon_code: Option<String>,
    pub products: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveredContent>,
    pub created_at: i64,
}

impl OrderView {
    fn from_order(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            status: order.status,
            payment_status: order.payment_status,
            amount: order.amount,
            discount_amount: order.discount_amount,
            coupon_code: order.coupon_code.clone(),
            products: order.products.clone(),
            delivery: order.visible_delivery().cloned(),
            created_at: order.created_at,
        }
    }
}

/// Checkout orchestrator and buyer order queries.
pub struct OrderService<S, A> {
    store: S,
    accounts: A,
}

impl<S, A> OrderService<S, A>
where
    S: OrderRepository + CouponRepository,
    A: AccountProvider,
{
    pub fn new(store: S, accounts: A) -> Self {
        Self { store, accounts }
    }

    /// Place an order from a checkout submission.
    ///
    /// Contact fields are checked before any account is created, and
    /// the coupon is re-validated against the submitted lines so a
    /// stale preview cannot smuggle in a dead discount. The insert is
    /// the only write; if it fails, no order exists.
    pub fn place(&self, request: &PlaceOrderRequest) -> Result<PlaceOrderReceipt, ApiError> {
        if request.lines.is_empty() {
            return Err(CommerceError::EmptyCart.into());
        }
        request.buyer.validate().map_err(ApiError::from)?;

        let applied = self.applied_coupon(request)?;
        let (user, session) = self.accounts.ensure_account(&request.buyer)?;
        let order = build_order(
            user.id,
            &request.lines,
            &request.buyer,
            request.payment.as_ref(),
            applied.as_ref(),
            request.currency,
        )?;
        self.store.insert_order(order.clone())?;

        tracing::info!(
            order = %order.id,
            number = %order.order_number,
            amount = %order.amount,
            free = order.is_free(),
            "order placed"
        );
        Ok(PlaceOrderReceipt {
            order_id: order.id,
            order_number: order.order_number,
            amount: order.amount,
            discount: order.discount_amount,
            session,
        })
    }

    /// One order, as the buyer may see it. A missing order and an order
    /// the viewer does not own answer the same way.
    pub fn order_for_buyer(&self, id: &OrderId, viewer: &User) -> Result<OrderView, ApiError> {
        let order = self
            .store
            .order(id)?
            .ok_or_else(|| ApiError::NotFound(format!("order {}", id)))?;
        if order.user != viewer.id && !viewer.is_admin() {
            return Err(ApiError::NotFound(format!("order {}", id)));
        }
        Ok(OrderView::from_order(&order))
    }

    /// All of the viewer's orders, newest first.
    pub fn orders_for_buyer(&self, viewer: &User) -> Result<Vec<OrderView>, ApiError> {
        let orders = self.store.orders_for_user(&viewer.id)?;
        Ok(orders.iter().map(OrderView::from_order).collect())
    }

    fn applied_coupon(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<Option<AppliedCoupon>, ApiError> {
        let code = match request.coupon_code.as_deref() {
            Some(code) if !code.trim().is_empty() => code,
            _ => return Ok(None),
        };
        let coupon = self.store.coupon_by_code(code)?.ok_or_else(|| {
            ApiError::from(CommerceError::CouponNotFound(code.trim().to_string()))
        })?;

        let subtotal = lines_subtotal(&request.lines, request.currency)?;
        let discount = coupon
            .validate(&subtotal, current_timestamp())
            .map_err(|reason| {
                ApiError::from(CommerceError::CouponRejected {
                    code: coupon.code.clone(),
                    reason,
                })
            })?;
        Ok(Some(AppliedCoupon {
            code: coupon.code,
            discount,
        }))
    }
}

fn lines_subtotal(lines: &[LineItem], currency: Currency) -> Result<Money, ApiError> {
    let mut subtotal = Money::zero(currency);
    for line in lines {
        let total = line.total()?;
        subtotal = subtotal
            .try_add(&total)
            .ok_or_else(|| ApiError::from(CommerceError::Overflow))?;
    }
    Ok(subtotal)
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
