//! Coupon types and redemption rules.
//!
//! Validation here is a read-only preview: `used_count` is consumed
//! only when an order carrying the coupon reaches completion, so an
//! abandoned checkout never burns a redemption.

use crate::ids::CouponId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The discount a coupon grants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CouponDiscount {
    /// Fixed amount off, capped at the subtotal.
    Fixed(Money),
    /// Percentage off (0.0 - 100.0), rounded to the nearest cent.
    Percentage(f64),
}

impl CouponDiscount {
    /// Calculate the discount amount for a given subtotal.
    ///
    /// The result is clamped to `[0, subtotal]`: a payable total can
    /// never go negative, and a misconfigured negative discount grants
    /// nothing instead of surcharging.
    pub fn calculate(&self, subtotal: &Money) -> Money {
        let discount = match self {
            CouponDiscount::Fixed(amount) => amount.min(subtotal),
            CouponDiscount::Percentage(percent) => subtotal.percentage(*percent).min(subtotal),
        };
        discount.max(&Money::zero(subtotal.currency))
    }
}

/// Why a coupon was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    /// No coupon exists under this code.
    NotFound,
    /// Coupon exists but has been deactivated.
    Inactive,
    /// Coupon expired.
    Expired,
    /// Usage limit already consumed.
    UsageLimitReached,
}

impl CouponRejection {
    /// Machine-readable reason string for the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponRejection::NotFound => "not_found",
            CouponRejection::Inactive => "inactive",
            CouponRejection::Expired => "expired",
            CouponRejection::UsageLimitReached => "usage_limit_reached",
        }
    }
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A coupon definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Coupon code, stored upper-cased.
    pub code: String,
    /// The discount granted.
    pub discount: CouponDiscount,
    /// Expiration (Unix timestamp); None means no expiry.
    pub expires_at: Option<i64>,
    /// Maximum redemptions; None means unlimited.
    pub usage_limit: Option<i64>,
    /// Redemptions consumed so far.
    pub used_count: i64,
    /// Whether the coupon is active.
    pub active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Coupon {
    /// Create an active coupon with the given code and discount.
    pub fn new(code: impl AsRef<str>, discount: CouponDiscount) -> Self {
        let now = current_timestamp();
        Self {
            id: CouponId::generate(),
            code: normalize_code(code.as_ref()),
            discount,
            expires_at: None,
            usage_limit: None,
            used_count: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set an expiration timestamp.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.expires_at = Some(timestamp);
        self
    }

    /// Set a usage limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Check whether this coupon matches a submitted code
    /// (case-insensitive).
    pub fn matches_code(&self, code: &str) -> bool {
        self.code == normalize_code(code)
    }

    /// Check if the coupon has expired at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map(|ends| ends < now).unwrap_or(false)
    }

    /// Check if the usage limit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.used_count >= limit)
            .unwrap_or(false)
    }

    /// Redeemability policy: active, unexpired, and under its limit.
    pub fn is_redeemable(&self, now: i64) -> bool {
        self.active && !self.is_expired(now) && !self.is_exhausted()
    }

    /// Validate this coupon against a subtotal.
    ///
    /// Read-only: returns the discount amount without touching
    /// `used_count`.
    pub fn validate(&self, subtotal: &Money, now: i64) -> Result<Money, CouponRejection> {
        if !self.active {
            return Err(CouponRejection::Inactive);
        }
        if self.is_expired(now) {
            return Err(CouponRejection::Expired);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::UsageLimitReached);
        }
        Ok(self.discount.calculate(subtotal))
    }
}

/// Normalize a coupon code for comparison and storage.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
