//! Order placement: turning cart lines plus buyer data into an Order.
//!
//! Pure construction, no storage. The branch between the zero-due fast
//! path and the payment-proof-required path lives here so every caller
//! gets the same rules.

use crate::cart::{normalize_code, LineItem};
use crate::checkout::order::{
    Order, OrderLine, OrderStatus, PaymentStatus, FREE_PAYMENT_METHOD, FREE_TRANSACTION_ID,
    NOT_APPLICABLE,
};
use crate::checkout::DeliveredContent;
use crate::error::CommerceError;
use crate::ids::{OrderId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Buyer contact details collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerInfo {
    /// Full name.
    pub name: String,
    /// Contact email; also the account identity for auto-registration.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
}

impl BuyerInfo {
    /// Validate that all required contact fields are present.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::MissingBuyerField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(CommerceError::MissingBuyerField("email"));
        }
        if self.phone.trim().is_empty() {
            return Err(CommerceError::MissingBuyerField("phone"));
        }
        Ok(())
    }
}

/// Buyer-asserted payment proof for a payable order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentProof {
    /// Transaction reference from the payment provider.
    pub transaction_id: String,
    /// Wallet/phone number the payment was sent from.
    pub sender_number: String,
    /// Payment method used (e.g., "bKash", "Nagad").
    pub payment_method: String,
}

/// A coupon the buyer applied, with its previewed discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    /// Coupon code as submitted.
    pub code: String,
    /// Discount amount computed by the validator.
    pub discount: Money,
}

/// Build an order from cart lines, buyer info, payment proof, and an
/// optionally applied coupon.
///
/// Order lines are verbatim snapshots of the cart lines; nothing is
/// re-resolved from the catalog. Fully-discounted orders skip payment
/// proof and carry the `FREE` sentinels; payable orders require a
/// non-empty transaction reference.
pub fn build_order(
    user: UserId,
    lines: &[LineItem],
    buyer: &BuyerInfo,
    proof: Option<&PaymentProof>,
    coupon: Option<&AppliedCoupon>,
    currency: Currency,
) -> Result<Order, CommerceError> {
    if lines.is_empty() {
        return Err(CommerceError::EmptyCart);
    }
    buyer.validate()?;

    let mut subtotal = Money::zero(currency);
    for line in lines {
        let line_total = line.total()?;
        subtotal = subtotal
            .try_add(&line_total)
            .ok_or_else(|| CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: line_total.currency.code().to_string(),
            })?;
    }

    let discount = coupon
        .map(|c| c.discount.min(&subtotal))
        .unwrap_or_else(|| Money::zero(currency));
    let final_total = subtotal.subtract_clamped(&discount);

    let (transaction_id, sender_number, payment_method) = if final_total.is_zero() {
        (
            FREE_TRANSACTION_ID.to_string(),
            NOT_APPLICABLE.to_string(),
            FREE_PAYMENT_METHOD.to_string(),
        )
    } else {
        let proof = proof.ok_or(CommerceError::MissingTransactionId)?;
        if proof.transaction_id.trim().is_empty() {
            return Err(CommerceError::MissingTransactionId);
        }
        (
            proof.transaction_id.trim().to_string(),
            proof.sender_number.clone(),
            proof.payment_method.clone(),
        )
    };

    let now = current_timestamp();
    Ok(Order {
        id: OrderId::generate(),
        order_number: Order::generate_order_number(),
        user,
        products: lines.iter().map(OrderLine::from_cart_line).collect(),
        transaction_id,
        sender_number,
        payment_method,
        amount: final_total,
        discount_amount: discount,
        coupon_code: coupon.map(|c| normalize_code(&c.code)),
        payment_status: PaymentStatus::Unpaid,
        status: OrderStatus::Pending,
        delivered_content: DeliveredContent::default(),
        created_at: now,
        updated_at: now,
    })
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
    use crate::cart::LineKey;
    use crate::catalog::PlanKey;
    use crate::ids::ProductId;

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn buyer() -> BuyerInfo {
        BuyerInfo {
            name: "Asha Rahman".to_string(),
            email: "asha@example.com".to_string(),
            phone: "01700000000".to_string(),
        }
    }

    fn proof() -> PaymentProof {
        PaymentProof {
            transaction_id: "TX-9F2".to_string(),
            sender_number: "01700000000".to_string(),
            payment_method: "bKash".to_string(),
        }
    }

    fn cart_line(product: &str, plan: PlanKey, price: i64, quantity: i64) -> LineItem {
        LineItem {
            key: LineKey::new(ProductId::new(product), plan),
            title: format!("Product {}", product),
            image: String::new(),
            category: "courses".to_string(),
            unit_price: bdt(price),
            reference_price: bdt(0),
            validity: plan.as_str().to_string(),
            quantity,
        }
    }

    #[test]
    fn test_standard_paid_order() {
        let lines = vec![cart_line("p1", PlanKey::Standard, 50000, 2)];

        // No transaction id -> rejected.
        let err = build_order(
            UserId::new("u1"),
            &lines,
            &buyer(),
            None,
            None,
            Currency::BDT,
        )
        .unwrap_err();
        assert!(matches!(err, CommerceError::MissingTransactionId));

        // With one -> amount is the full subtotal.
        let order = build_order(
            UserId::new("u1"),
            &lines,
            &buyer(),
            Some(&proof()),
            None,
            Currency::BDT,
        )
        .unwrap();
        assert_eq!(order.amount, bdt(100000));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_fully_discounted_order_is_free() {
        let lines = vec![cart_line("p1", PlanKey::Standard, 20000, 1)];
        let coupon = AppliedCoupon {
            code: "all-free".to_string(),
            discount: bdt(20000),
        };

        // No payment proof needed.
        let order = build_order(
            UserId::new("u1"),
            &lines,
            &buyer(),
            None,
            Some(&coupon),
            Currency::BDT,
        )
        .unwrap();

        assert!(order.is_free());
        assert_eq!(order.transaction_id, FREE_TRANSACTION_ID);
        assert_eq!(order.payment_method, FREE_PAYMENT_METHOD);
        assert_eq!(order.coupon_code.as_deref(), Some("ALL-FREE"));
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let lines = vec![cart_line("p1", PlanKey::Standard, 10000, 1)];
        let coupon = AppliedCoupon {
            code: "HUGE".to_string(),
            discount: bdt(500000),
        };

        let order = build_order(
            UserId::new("u1"),
            &lines,
            &buyer(),
            None,
            Some(&coupon),
            Currency::BDT,
        )
        .unwrap();

        assert_eq!(order.discount_amount, bdt(10000));
        assert!(order.amount.is_zero());
    }

    #[test]
    fn test_lines_are_snapshots() {
        let lines = vec![
            cart_line("p1", PlanKey::Monthly, 10000, 1),
            cart_line("p1", PlanKey::Yearly, 90000, 1),
        ];

        let order = build_order(
            UserId::new("u1"),
            &lines,
            &buyer(),
            Some(&proof()),
            None,
            Currency::BDT,
        )
        .unwrap();

        assert_eq!(order.products.len(), 2);
        assert_eq!(order.products[0].variant, "monthly");
        assert_eq!(order.products[0].price, bdt(10000));
        assert_eq!(order.products[1].variant, "yearly");
        assert_eq!(order.amount, bdt(100000));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = build_order(
            UserId::new("u1"),
            &[],
            &buyer(),
            Some(&proof()),
            None,
            Currency::BDT,
        )
        .unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));
    }

    #[test]
    fn test_missing_contact_field_rejected() {
        let lines = vec![cart_line("p1", PlanKey::Standard, 10000, 1)];
        let mut incomplete = buyer();
        incomplete.email = "  ".to_string();

        let err = build_order(
            UserId::new("u1"),
            &lines,
            &incomplete,
            Some(&proof()),
            None,
            Currency::BDT,
        )
        .unwrap_err();
        assert!(matches!(err, CommerceError::MissingBuyerField("email")));
    }
}
