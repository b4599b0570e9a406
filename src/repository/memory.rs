//! In-memory store used by tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CouponRepository, OrderRepository, ProductRepository, VariantRepository};
use crate::domain::aggregates::{product, Coupon, OrderStatus, Product, Variant};
use crate::domain::value_objects::{CouponCode, ProductId, VariantId};
use crate::{CouponError, Result};

#[derive(Clone, Debug)]
pub struct OrderRecord {
    pub user_id: String,
    pub coupon_code: CouponCode,
    pub status: OrderStatus,
}

#[derive(Default)]
pub struct MemoryStore {
    coupons: RwLock<HashMap<CouponCode, Coupon>>,
    products: RwLock<HashMap<ProductId, Product>>,
    variants: RwLock<HashMap<VariantId, Variant>>,
    orders: RwLock<Vec<OrderRecord>>,
}

fn poisoned<T>(_: T) -> CouponError { CouponError::Storage("memory store lock poisoned".into()) }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert_coupon(&self, coupon: Coupon) -> Result<()> {
        self.coupons.write().map_err(poisoned)?.insert(coupon.code().clone(), coupon);
        Ok(())
    }

    pub fn insert_product(&self, product: Product) -> Result<()> {
        self.products.write().map_err(poisoned)?.insert(product.id.clone(), product);
        Ok(())
    }

    pub fn insert_variant(&self, variant: Variant) -> Result<()> {
        self.variants.write().map_err(poisoned)?.insert(variant.id.clone(), variant);
        Ok(())
    }

    pub fn insert_order(&self, user_id: impl Into<String>, coupon_code: CouponCode, status: OrderStatus) -> Result<()> {
        self.orders.write().map_err(poisoned)?.push(OrderRecord { user_id: user_id.into(), coupon_code, status });
        Ok(())
    }

    fn live_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.get(id).filter(|p| !p.is_deleted()).cloned())
    }

    fn populate(&self, mut variant: Variant) -> Result<Variant> {
        variant.product = self.products.read().map_err(poisoned)?.get(&variant.product_id).cloned();
        Ok(variant)
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn find_active_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        let coupons = self.coupons.read().map_err(poisoned)?;
        Ok(coupons.get(code).filter(|c| !c.is_deleted()).cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> { self.live_product(id) }
}

#[async_trait]
impl VariantRepository for MemoryStore {
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>> {
        let found = self.variants.read().map_err(poisoned)?.get(id).filter(|v| !v.is_deleted()).cloned();
        found.map(|v| self.populate(v)).transpose()
    }

    async fn find_cheapest_in_stock(&self, product_id: &ProductId) -> Result<Option<Variant>> {
        let cheapest = {
            let variants = self.variants.read().map_err(poisoned)?;
            let mut candidates: Vec<&Variant> = variants
                .values()
                .filter(|v| &v.product_id == product_id && !v.is_deleted() && v.in_stock())
                .collect();
            candidates.sort_by(|a, b| product::cheapest_first(a, b));
            candidates.first().map(|v| (*v).clone())
        };
        cheapest.map(|v| self.populate(v)).transpose()
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn count_by_user_and_coupon_excluding_statuses(
        &self,
        user_id: &str,
        code: &CouponCode,
        excluded: &[OrderStatus],
    ) -> Result<u64> {
        let orders = self.orders.read().map_err(poisoned)?;
        let count = orders
            .iter()
            .filter(|o| o.user_id == user_id && &o.coupon_code == code && !excluded.contains(&o.status))
            .count();
        Ok(count as u64)
    }
}
