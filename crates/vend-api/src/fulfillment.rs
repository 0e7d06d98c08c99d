//! Admin fulfillment: completing or declining pending orders.
//!
//! Side-effect ordering matters here. Completion consumes the coupon
//! redemption first, through the store's compare-and-increment, so the
//! usage limit can never be oversubscribed even when two admins race.
//! Only then is the guarded status write attempted; if that write loses,
//! the redemption is handed back. Sales counters come last and are
//! advisory: a failed counter bump is logged, never rolled back into a
//! failed completion.

use crate::ApiError;
use vend_auth::User;
use vend_commerce::checkout::{DeliveredContent, Order};
use vend_commerce::ids::OrderId;
use vend_store::{CouponRepository, OrderRepository, ProductRepository};

/// Admin-only order transitions.
pub struct FulfillmentService<S> {
    store: S,
}

impl<S> FulfillmentService<S>
where
    S: OrderRepository + CouponRepository + ProductRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Verify payment and deliver: `pending -> completed`.
    ///
    /// Attaches the delivery content, marks the order paid, consumes
    /// one coupon redemption, and bumps the sales counters. Retrying a
    /// finished order answers with a conflict and repeats no side
    /// effect.
    pub fn complete(
        &self,
        id: &OrderId,
        content: DeliveredContent,
        actor: &User,
    ) -> Result<Order, ApiError> {
        require_admin(actor)?;
        let mut order = self.load(id)?;
        order.complete(content)?;

        if let Some(code) = order.coupon_code.clone() {
            if !self.store.redeem_coupon(&code)? {
                tracing::warn!(order = %order.id, coupon = %code, "coupon exhausted at completion");
                return Err(ApiError::Conflict(format!(
                    "coupon {} usage limit reached",
                    code
                )));
            }
            if let Err(err) = self.store.store_transition(&order) {
                // The status write lost; hand the redemption back.
                if let Err(release_err) = self.store.release_coupon(&code) {
                    tracing::error!(
                        order = %order.id,
                        coupon = %code,
                        error = %release_err,
                        "failed to release coupon redemption"
                    );
                }
                return Err(err.into());
            }
        } else {
            self.store.store_transition(&order)?;
        }

        for line in &order.products {
            if let Err(err) = self.store.record_product_sales(&line.product, line.quantity) {
                tracing::warn!(
                    order = %order.id,
                    product = %line.product,
                    error = %err,
                    "failed to record sales"
                );
            }
        }

        tracing::info!(order = %order.id, admin = %actor.id, "order completed");
        Ok(order)
    }

    /// Refuse payment: `pending -> cancelled`, payment marked failed.
    /// No coupon redemption is consumed and no counters move.
    pub fn decline(&self, id: &OrderId, actor: &User) -> Result<Order, ApiError> {
        require_admin(actor)?;
        let mut order = self.load(id)?;
        order.decline()?;
        self.store.store_transition(&order)?;

        tracing::info!(order = %order.id, admin = %actor.id, "order declined");
        Ok(order)
    }

    fn load(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.store
            .order(id)?
            .ok_or_else(|| ApiError::NotFound(format!("order {}", id)))
    }
}

fn require_admin(actor: &User) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Unauthorized(format!(
            "user {} is not an admin",
            actor.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vend_auth::Role;
    use vend_commerce::cart::{Coupon, CouponDiscount};
    use vend_commerce::catalog::Product;
    use vend_commerce::checkout::{OrderLine, OrderStatus, PaymentStatus};
    use vend_commerce::ids::{ProductId, UserId};
    use vend_commerce::money::{Currency, Money};
    use vend_store::MemoryStore;

    fn bdt(amount: i64) -> Money {
        Money::new(amount, Currency::BDT)
    }

    fn admin() -> User {
        User::new(UserId::new("a1"), "admin@example.com", None, Role::Admin)
    }

    fn customer() -> User {
        User::new(UserId::new("c1"), "c@example.com", None, Role::Customer)
    }

    fn delivery() -> DeliveredContent {
        DeliveredContent {
            download_link: "https://example.com/dl".to_string(),
            ..Default::default()
        }
    }

    fn pending_order(id: &str, coupon: Option<&str>) -> Order {
        Order {
            id: OrderId::new(id),
            order_number: format!("ORD-{}", id),
            user: UserId::new("c1"),
            products: vec![OrderLine {
                product: ProductId::new("p1"),
                quantity: 2,
                price: bdt(50000),
                title: "Course".to_string(),
                variant: "Standard".to_string(),
            }],
            transaction_id: "TX1".to_string(),
            sender_number: "017".to_string(),
            payment_method: "bKash".to_string(),
            amount: bdt(100000),
            discount_amount: bdt(0),
            coupon_code: coupon.map(str::to_string),
            payment_status: PaymentStatus::Unpaid,
            status: OrderStatus::Pending,
            delivered_content: DeliveredContent::default(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn store_with_order(order: Order) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_product(Product::new(ProductId::new("p1"), "Course", bdt(50000)))
            .unwrap();
        store.insert_order(order).unwrap();
        store
    }

    #[test]
    fn test_customer_cannot_transition() {
        let store = store_with_order(pending_order("o1", None));
        let service = FulfillmentService::new(&store);

        assert!(matches!(
            service.complete(&OrderId::new("o1"), delivery(), &customer()),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            service.decline(&OrderId::new("o1"), &customer()),
            Err(ApiError::Unauthorized(_))
        ));
        let stored = store.order(&OrderId::new("o1")).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[test]
    fn test_complete_delivers_and_counts() {
        let store = store_with_order(pending_order("o1", Some("SAVE")));
        store
            .insert_coupon(Coupon::new("SAVE", CouponDiscount::Fixed(bdt(100))).with_usage_limit(3))
            .unwrap();
        let service = FulfillmentService::new(&store);

        let order = service
            .complete(&OrderId::new("o1"), delivery(), &admin())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.visible_delivery().is_some());

        assert_eq!(store.coupon_by_code("SAVE").unwrap().unwrap().used_count, 1);
        let product = store.product(&ProductId::new("p1")).unwrap().unwrap();
        assert_eq!(product.sales_count, 2);
    }

    #[test]
    fn test_retry_conflicts_without_double_redeem() {
        let store = store_with_order(pending_order("o1", Some("SAVE")));
        store
            .insert_coupon(Coupon::new("SAVE", CouponDiscount::Fixed(bdt(100))).with_usage_limit(3))
            .unwrap();
        let service = FulfillmentService::new(&store);

        service
            .complete(&OrderId::new("o1"), delivery(), &admin())
            .unwrap();
        let err = service
            .complete(&OrderId::new("o1"), delivery(), &admin())
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // The retry consumed nothing and repeated no counter bump.
        assert_eq!(store.coupon_by_code("SAVE").unwrap().unwrap().used_count, 1);
        let product = store.product(&ProductId::new("p1")).unwrap().unwrap();
        assert_eq!(product.sales_count, 2);
    }

    #[test]
    fn test_exhausted_coupon_blocks_completion() {
        let store = store_with_order(pending_order("o1", Some("ONE")));
        store.insert_order(pending_order("o2", Some("ONE"))).unwrap();
        store
            .insert_coupon(Coupon::new("ONE", CouponDiscount::Fixed(bdt(100))).with_usage_limit(1))
            .unwrap();
        let service = FulfillmentService::new(&store);

        service
            .complete(&OrderId::new("o1"), delivery(), &admin())
            .unwrap();
        let err = service
            .complete(&OrderId::new("o2"), delivery(), &admin())
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // The second order is untouched, still pending.
        let second = store.order(&OrderId::new("o2")).unwrap().unwrap();
        assert_eq!(second.status, OrderStatus::Pending);
        assert_eq!(store.coupon_by_code("ONE").unwrap().unwrap().used_count, 1);
    }

    #[test]
    fn test_decline_leaves_coupon_and_counters_alone() {
        let store = store_with_order(pending_order("o1", Some("SAVE")));
        store
            .insert_coupon(Coupon::new("SAVE", CouponDiscount::Fixed(bdt(100))).with_usage_limit(3))
            .unwrap();
        let service = FulfillmentService::new(&store);

        let order = service.decline(&OrderId::new("o1"), &admin()).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert!(order.visible_delivery().is_none());

        assert_eq!(store.coupon_by_code("SAVE").unwrap().unwrap().used_count, 0);
        let product = store.product(&ProductId::new("p1")).unwrap().unwrap();
        assert_eq!(product.sales_count, 0);
    }

    #[test]
    fn test_complete_requires_content() {
        let store = store_with_order(pending_order("o1", None));
        let service = FulfillmentService::new(&store);

        let err = service
            .complete(&OrderId::new("o1"), DeliveredContent::default(), &admin())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let stored = store.order(&OrderId::new("o1")).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[test]
    fn test_missing_order_not_found() {
        let store = MemoryStore::new();
        let service = FulfillmentService::new(&store);
        assert!(matches!(
            service.complete(&OrderId::new("ghost"), delivery(), &admin()),
            Err(ApiError::NotFound(_))
        ));
    }
}
