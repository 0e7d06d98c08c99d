//! Product types with plan pricing configuration.

use crate::catalog::PlanKey;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing configuration for one subscription plan on a product.
///
/// `access_link` and `access_note` are delivery secrets: they are part
/// of the catalog record but must never be serialized into carts,
/// orders, or buyer-facing views. They only surface through fulfillment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanConfig {
    /// Whether this plan is selectable at all.
    pub enabled: bool,
    /// Effective price for the plan.
    pub price: Money,
    /// Reference ("regular") price, for strikethrough display.
    pub regular_price: Money,
    /// Human validity label (e.g., "1 Month", "Lifetime").
    pub validity_label: String,
    /// Marketing description.
    pub description: String,
    /// Secret delivery link for this plan.
    pub access_link: String,
    /// Secret delivery note for this plan.
    pub access_note: String,
}

impl PlanConfig {
    /// Create an enabled plan with a price and validity label.
    pub fn new(price: Money, regular_price: Money, validity_label: impl Into<String>) -> Self {
        Self {
            enabled: true,
            price,
            regular_price,
            validity_label: validity_label.into(),
            ..Default::default()
        }
    }

    /// Disable this plan, keeping its configuration around.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// The non-subscription "full account access" plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccountAccess {
    /// Whether account access can be purchased.
    pub enabled: bool,
    /// One-time price for full account access.
    pub price: Money,
}

impl AccountAccess {
    /// Create an enabled account-access plan.
    pub fn new(price: Money) -> Self {
        Self {
            enabled: true,
            price,
        }
    }
}

/// A product in the catalog.
///
/// Carries the standard/fallback tier prices plus up to three
/// subscription plans and an optional account-access plan. Disabled
/// plans stay in the record but never price a selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Primary image URL (denormalized into cart lines).
    pub image: String,
    /// Category name (denormalized into cart lines).
    pub category: String,
    /// Product currency.
    pub currency: Currency,
    /// Fallback price when no sale is running.
    pub default_price: Money,
    /// Sale price; takes effect when positive.
    pub sale_price: Money,
    /// Reference price for the standard tier.
    pub regular_price: Money,
    /// Monthly subscription plan.
    pub monthly: Option<PlanConfig>,
    /// Yearly subscription plan.
    pub yearly: Option<PlanConfig>,
    /// Lifetime plan.
    pub lifetime: Option<PlanConfig>,
    /// Full-account-access plan.
    pub account_access: Option<AccountAccess>,
    /// Number of units sold across all plans.
    pub sales_count: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a product with only the standard tier configured.
    pub fn new(id: ProductId, title: impl Into<String>, default_price: Money) -> Self {
        let now = current_timestamp();
        Self {
            id,
            title: title.into(),
            image: String::new(),
            category: String::new(),
            currency: default_price.currency,
            default_price,
            sale_price: Money::zero(default_price.currency),
            regular_price: Money::zero(default_price.currency),
            monthly: None,
            yearly: None,
            lifetime: None,
            account_access: None,
            sales_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the standard-tier sale and regular prices.
    pub fn with_sale(mut self, sale_price: Money, regular_price: Money) -> Self {
        self.sale_price = sale_price;
        self.regular_price = regular_price;
        self
    }

    /// Attach a subscription plan.
    pub fn with_plan(mut self, key: PlanKey, config: PlanConfig) -> Self {
        match key {
            PlanKey::Monthly => self.monthly = Some(config),
            PlanKey::Yearly => self.yearly = Some(config),
            PlanKey::Lifetime => self.lifetime = Some(config),
            // Standard and account access are not PlanConfig-shaped.
            PlanKey::Standard | PlanKey::AccountAccess => {}
        }
        self
    }

    /// Attach an account-access plan.
    pub fn with_account_access(mut self, access: AccountAccess) -> Self {
        self.account_access = Some(access);
        self
    }

    /// Look up the subscription plan config for a key, if any.
    pub fn plan_config(&self, key: PlanKey) -> Option<&PlanConfig> {
        match key {
            PlanKey::Monthly => self.monthly.as_ref(),
            PlanKey::Yearly => self.yearly.as_ref(),
            PlanKey::Lifetime => self.lifetime.as_ref(),
            PlanKey::Standard | PlanKey::AccountAccess => None,
        }
    }

    /// The standard-tier effective price: sale price when positive,
    /// otherwise the default price.
    pub fn standard_price(&self) -> Money {
        if self.sale_price.is_positive() {
            self.sale_price
        } else {
            self.default_price
        }
    }

    /// Record sold units (catalog-side counter, not order state).
    pub fn record_sales(&mut self, quantity: i64) {
        self.sales_count = self.sales_count.saturating_add(quantity);
        self.updated_at = current_timestamp();
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

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    #[test]
    fn test_standard_price_prefers_sale() {
        let product = Product::new(ProductId::new("p1"), "Course", bdt(50000))
            .with_sale(bdt(40000), bdt(60000));
        assert_eq!(product.standard_price(), bdt(40000));
    }

    #[test]
    fn test_standard_price_falls_back_to_default() {
        let product = Product::new(ProductId::new("p1"), "Course", bdt(50000));
        assert_eq!(product.standard_price(), bdt(50000));
    }

    #[test]
    fn test_plan_lookup() {
        let product = Product::new(ProductId::new("p1"), "Course", bdt(50000)).with_plan(
            PlanKey::Monthly,
            PlanConfig::new(bdt(10000), bdt(15000), "1 Month"),
        );
        assert!(product.plan_config(PlanKey::Monthly).is_some());
        assert!(product.plan_config(PlanKey::Yearly).is_none());
        assert!(product.plan_config(PlanKey::Standard).is_none());
    }

    #[test]
    fn test_record_sales() {
        let mut product = Product::new(ProductId::new("p1"), "Course", bdt(50000));
        product.record_sales(2);
        product.record_sales(1);
        assert_eq!(product.sales_count, 3);
    }
}
