//! Coupon preview endpoint logic.
//!
//! A refused coupon is a normal answer, not an error: the response
//! carries `valid: false` plus a machine-readable reason, and the
//! checkout UI renders it inline. Only infrastructure failures surface
//! as [`ApiError`].

use crate::ApiError;
use serde::{Deserialize, Serialize};
use vend_commerce::cart::CouponRejection;
use vend_commerce::money::{Currency, Money};
use vend_store::CouponRepository;

/// Outcome of a coupon preview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponCheck {
    /// Whether the coupon applies to this subtotal.
    pub valid: bool,
    /// Discount the coupon would grant; zero when invalid.
    pub discount: Money,
    /// Why the coupon was refused, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CouponRejection>,
}

impl CouponCheck {
    fn accepted(discount: Money) -> Self {
        Self {
            valid: true,
            discount,
            reason: None,
        }
    }

    fn refused(reason: CouponRejection, currency: Currency) -> Self {
        Self {
            valid: false,
            discount: Money::zero(currency),
            reason: Some(reason),
        }
    }
}

/// Read-only coupon validation against a cart subtotal.
pub struct CouponService<R> {
    coupons: R,
}

impl<R: CouponRepository> CouponService<R> {
    pub fn new(coupons: R) -> Self {
        Self { coupons }
    }

    /// Preview a coupon against a subtotal. Never consumes a redemption.
    pub fn validate(&self, code: &str, subtotal: &Money) -> Result<CouponCheck, ApiError> {
        let coupon = match self.coupons.coupon_by_code(code)? {
            Some(coupon) => coupon,
            None => {
                tracing::debug!(code, "coupon lookup missed");
                return Ok(CouponCheck::refused(
                    CouponRejection::NotFound,
                    subtotal.currency,
                ));
            }
        };

        match coupon.validate(subtotal, current_timestamp()) {
            Ok(discount) => Ok(CouponCheck::accepted(discount)),
            Err(reason) => {
                tracing::debug!(code = %coupon.code, reason = %reason, "coupon refused");
                Ok(CouponCheck::refused(reason, subtotal.currency))
            }
        }
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
    use vend_commerce::cart::{Coupon, CouponDiscount};
    use vend_commerce::money::Currency;
    use vend_store::MemoryStore;

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    #[test]
    fn test_unknown_code_refused_not_errored() {
        let service = CouponService::new(MemoryStore::new());
        let check = service.validate("NOPE", &bdt(1000)).unwrap();
        assert!(!check.valid);
        assert_eq!(check.reason, Some(CouponRejection::NotFound));
        assert!(check.discount.is_zero());
    }

    #[test]
    fn test_valid_coupon_previews_discount() {
        let store = MemoryStore::new();
        store
            .insert_coupon(Coupon::new("TEN", CouponDiscount::Percentage(10.0)))
            .unwrap();

        let service = CouponService::new(store);
        let check = service.validate("ten", &bdt(75000)).unwrap();
        assert!(check.valid);
        assert_eq!(check.discount, bdt(7500));
    }

    #[test]
    fn test_preview_does_not_consume_usage() {
        let store = MemoryStore::new();
        store
            .insert_coupon(Coupon::new("ONE", CouponDiscount::Fixed(bdt(500))).with_usage_limit(1))
            .unwrap();

        let service = CouponService::new(&store);
        assert!(service.validate("ONE", &bdt(1000)).unwrap().valid);
        assert!(service.validate("ONE", &bdt(1000)).unwrap().valid);
        assert_eq!(store.coupon_by_code("ONE").unwrap().unwrap().used_count, 0);
    }

    #[test]
    fn test_exhausted_coupon_refused() {
        let store = MemoryStore::new();
        store
            .insert_coupon(Coupon::new("GONE", CouponDiscount::Fixed(bdt(500))).with_usage_limit(1))
            .unwrap();
        store.redeem_coupon("GONE").unwrap();

        let service = CouponService::new(store);
        let check = service.validate("GONE", &bdt(1000)).unwrap();
        assert_eq!(check.reason, Some(CouponRejection::UsageLimitReached));
    }
}
