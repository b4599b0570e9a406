//! Read-side collaborators the coupon engine depends on.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::domain::aggregates::{Coupon, OrderStatus, Product, Variant};
use crate::domain::value_objects::{CouponCode, ProductId, VariantId};
use crate::Result;

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Non-deleted coupon with this code.
    async fn find_active_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Product by id, soft-deleted products are returned as `None`.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>>;
}

#[async_trait]
pub trait VariantRepository: Send + Sync {
    /// Variant by id with its parent product populated.
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>>;

    /// Cheapest non-deleted variant of `product_id` with stock left.
    async fn find_cheapest_in_stock(&self, product_id: &ProductId) -> Result<Option<Variant>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn count_by_user_and_coupon_excluding_statuses(
        &self,
        user_id: &str,
        code: &CouponCode,
        excluded: &[OrderStatus],
    ) -> Result<u64>;
}

/// Every collaborator the engine needs, behind one object.
pub trait Store: CouponRepository + ProductRepository + VariantRepository + OrderRepository {}

impl<T> Store for T where T: CouponRepository + ProductRepository + VariantRepository + OrderRepository {}
