//! Price resolution for plan-aware products.
//!
//! Every selectable (product, plan) pair resolves to exactly one
//! canonical price. Disabled or absent plans fall back to the standard
//! tier so the storefront can never construct an unpriced selection.

use crate::catalog::Product;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validity label used for the standard tier.
pub const STANDARD_LABEL: &str = "Standard";

/// Validity label used for the account-access plan.
pub const ACCOUNT_ACCESS_LABEL: &str = "Full Account Access";

/// A named pricing tier on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanKey {
    /// The implicit standard/fallback tier.
    #[default]
    #[serde(rename = "default")]
    Standard,
    Monthly,
    Yearly,
    Lifetime,
    AccountAccess,
}

impl PlanKey {
    /// Get the plan key as its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKey::Standard => "default",
            PlanKey::Monthly => "monthly",
            PlanKey::Yearly => "yearly",
            PlanKey::Lifetime => "lifetime",
            PlanKey::AccountAccess => "account_access",
        }
    }

    /// Whether this key names one of the subscription plans.
    pub fn is_subscription(&self) -> bool {
        matches!(self, PlanKey::Monthly | PlanKey::Yearly | PlanKey::Lifetime)
    }

    /// All subscription plan keys.
    pub fn subscriptions() -> [PlanKey; 3] {
        [PlanKey::Monthly, PlanKey::Yearly, PlanKey::Lifetime]
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "default" and "standard" are both accepted for the
            // standard tier; older cart blobs used either.
            "default" | "standard" => Ok(PlanKey::Standard),
            "monthly" => Ok(PlanKey::Monthly),
            "yearly" => Ok(PlanKey::Yearly),
            "lifetime" => Ok(PlanKey::Lifetime),
            "account_access" => Ok(PlanKey::AccountAccess),
            _ => Err(()),
        }
    }
}

/// The canonical price for a (product, plan) selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPrice {
    /// The plan that actually priced the selection. May differ from the
    /// requested plan when the resolver fell back to the standard tier.
    pub plan: PlanKey,
    /// Effective unit price.
    pub unit_price: Money,
    /// Reference ("regular") price for display.
    pub reference_price: Money,
    /// Human validity label for the tier.
    pub validity_label: String,
}

impl ResolvedPrice {
    /// Display discount percentage, rounded. Never negative, and zero
    /// whenever the reference price does not exceed the unit price.
    pub fn discount_percent(&self) -> u32 {
        let reference = self.reference_price.amount_cents;
        let unit = self.unit_price.amount_cents;
        if reference > unit && reference > 0 {
            (((reference - unit) as f64 / reference as f64) * 100.0).round() as u32
        } else {
            0
        }
    }
}

/// Resolve the effective price for a product under a requested plan.
///
/// Subscription plans and account access price the selection only when
/// enabled; anything else falls back to the standard tier rather than
/// failing.
pub fn resolve_price(product: &Product, requested: PlanKey) -> ResolvedPrice {
    if requested.is_subscription() {
        if let Some(config) = product.plan_config(requested).filter(|c| c.enabled) {
            return ResolvedPrice {
                plan: requested,
                unit_price: config.price,
                reference_price: config.regular_price,
                validity_label: config.validity_label.clone(),
            };
        }
    }

    if requested == PlanKey::AccountAccess {
        if let Some(access) = product.account_access.as_ref().filter(|a| a.enabled) {
            return ResolvedPrice {
                plan: PlanKey::AccountAccess,
                unit_price: access.price,
                reference_price: Money::zero(product.currency),
                validity_label: ACCOUNT_ACCESS_LABEL.to_string(),
            };
        }
    }

    ResolvedPrice {
        plan: PlanKey::Standard,
        unit_price: product.standard_price(),
        reference_price: product.regular_price,
        validity_label: STANDARD_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccountAccess, PlanConfig};
    use crate::ids::ProductId;
    use crate::money::Currency;

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn product_with_plans() -> Product {
        Product::new(ProductId::new("p1"), "Course", bdt(50000))
            .with_sale(bdt(40000), bdt(60000))
            .with_plan(
                PlanKey::Monthly,
                PlanConfig::new(bdt(10000), bdt(15000), "1 Month"),
            )
            .with_plan(
                PlanKey::Yearly,
                PlanConfig::new(bdt(90000), bdt(120000), "1 Year").disabled(),
            )
            .with_account_access(AccountAccess::new(bdt(200000)))
    }

    #[test]
    fn test_resolve_enabled_subscription() {
        let resolved = resolve_price(&product_with_plans(), PlanKey::Monthly);
        assert_eq!(resolved.plan, PlanKey::Monthly);
        assert_eq!(resolved.unit_price, bdt(10000));
        assert_eq!(resolved.reference_price, bdt(15000));
        assert_eq!(resolved.validity_label, "1 Month");
    }

    #[test]
    fn test_disabled_plan_falls_back_to_standard() {
        let resolved = resolve_price(&product_with_plans(), PlanKey::Yearly);
        assert_eq!(resolved.plan, PlanKey::Standard);
        assert_eq!(resolved.unit_price, bdt(40000));
        assert_eq!(resolved.validity_label, STANDARD_LABEL);
    }

    #[test]
    fn test_missing_plan_falls_back_to_standard() {
        let resolved = resolve_price(&product_with_plans(), PlanKey::Lifetime);
        assert_eq!(resolved.plan, PlanKey::Standard);
    }

    #[test]
    fn test_resolve_account_access() {
        let resolved = resolve_price(&product_with_plans(), PlanKey::AccountAccess);
        assert_eq!(resolved.plan, PlanKey::AccountAccess);
        assert_eq!(resolved.unit_price, bdt(200000));
        assert!(resolved.reference_price.is_zero());
        assert_eq!(resolved.validity_label, ACCOUNT_ACCESS_LABEL);
    }

    #[test]
    fn test_discount_percent() {
        let resolved = resolve_price(&product_with_plans(), PlanKey::Monthly);
        // (15000 - 10000) / 15000 = 33.33 -> 33
        assert_eq!(resolved.discount_percent(), 33);
    }

    #[test]
    fn test_discount_percent_never_negative() {
        let resolved = ResolvedPrice {
            plan: PlanKey::Standard,
            unit_price: bdt(10000),
            reference_price: bdt(5000),
            validity_label: STANDARD_LABEL.to_string(),
        };
        assert_eq!(resolved.discount_percent(), 0);
    }

    #[test]
    fn test_plan_key_roundtrip() {
        for key in [
            PlanKey::Standard,
            PlanKey::Monthly,
            PlanKey::Yearly,
            PlanKey::Lifetime,
            PlanKey::AccountAccess,
        ] {
            assert_eq!(key.as_str().parse::<PlanKey>(), Ok(key));
        }
        assert_eq!("standard".parse::<PlanKey>(), Ok(PlanKey::Standard));
        assert!("weekly".parse::<PlanKey>().is_err());
    }
}
