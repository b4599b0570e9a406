//! Postgres-backed repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CouponRepository, OrderRepository, ProductRepository, VariantRepository};
use crate::domain::aggregates::{Coupon, CouponMode, DiscountTier, DiscountType, OrderStatus, Product, Targeting, TierSwitch, Variant};
use crate::domain::value_objects::{CouponCode, ProductId, VariantId};
use crate::{CouponError, Result};

#[derive(Clone)]
pub struct PgStore { db: PgPool }

impl PgStore {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    code: String,
    discount_type: String,
    discount_amount: Decimal,
    change_after_usage: i32,
    new_discount_type: Option<String>,
    new_discount_amount: Option<Decimal>,
    redemptions_total: i32,
    total_limit: i32,
    per_user_limit: i32,
    specific_products: Vec<String>,
    specific_variants: Vec<String>,
    free_item_product: Option<String>,
    free_item_variant: Option<String>,
    free_item_qty: i32,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    mrp: Decimal,
    special_price: Option<Decimal>,
    stock: i64,
    has_variants: bool,
    images: Vec<String>,
    hero_image: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    name: String,
    mrp: Decimal,
    special_price: Option<Decimal>,
    stock: i64,
    images: Vec<String>,
    swatch_image: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
}

fn non_negative(value: i32) -> u32 { u32::try_from(value).unwrap_or(0) }

fn present(value: Option<String>) -> Option<String> { value.filter(|v| !v.trim().is_empty()) }

impl TryFrom<CouponRow> for Coupon {
    type Error = CouponError;

    fn try_from(row: CouponRow) -> Result<Self> {
        let code = CouponCode::new(row.code).map_err(|e| CouponError::Storage(e.to_string()))?;
        let kind = DiscountType::parse(&row.discount_type)
            .ok_or_else(|| CouponError::Storage(format!("coupon {} has unknown discount type {:?}", code, row.discount_type)))?;
        let switch = TierSwitch {
            after_usage: non_negative(row.change_after_usage),
            kind: row.new_discount_type.as_deref().and_then(DiscountType::parse),
            amount: row.new_discount_amount,
        };
        let mode = CouponMode::resolve(
            DiscountTier::new(kind, row.discount_amount),
            switch,
            present(row.free_item_product).map(ProductId::new),
            present(row.free_item_variant).map(VariantId::new),
            non_negative(row.free_item_qty),
        );
        let targeting = Targeting::from_sets(
            row.specific_products.into_iter().map(ProductId::new),
            row.specific_variants.into_iter().map(VariantId::new),
        );
        Ok(Coupon::new(code, mode)
            .with_targeting(targeting)
            .with_redemptions(non_negative(row.redemptions_total))
            .with_limits(non_negative(row.total_limit), non_negative(row.per_user_limit))
            .with_deleted_at(row.deleted_at))
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id), name: row.name, mrp: row.mrp, special_price: row.special_price,
            stock: row.stock, has_variants: row.has_variants, images: row.images,
            hero_image: row.hero_image, deleted_at: row.deleted_at,
        }
    }
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: VariantId::new(row.id), product_id: ProductId::new(row.product_id), name: row.name,
            mrp: row.mrp, special_price: row.special_price, stock: row.stock, images: row.images,
            swatch_image: row.swatch_image, deleted_at: row.deleted_at, product: None,
        }
    }
}

impl PgStore {
    async fn fetch_product(&self, id: &str) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id).fetch_optional(&self.db).await?;
        Ok(row.map(Product::from))
    }

    async fn populate(&self, row: VariantRow) -> Result<Variant> {
        let mut variant = Variant::from(row);
        variant.product = self.fetch_product(variant.product_id.as_str()).await?;
        Ok(variant)
    }
}

#[async_trait]
impl CouponRepository for PgStore {
    async fn find_active_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE code = $1 AND deleted_at IS NULL")
            .bind(code.as_str()).fetch_optional(&self.db).await?
            .map(Coupon::try_from).transpose()
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> { self.fetch_product(id.as_str()).await }
}

#[async_trait]
impl VariantRepository for PgStore {
    async fn find_by_id(&self, id: &VariantId) -> Result<Option<Variant>> {
        let row = sqlx::query_as::<_, VariantRow>("SELECT * FROM variants WHERE id = $1 AND deleted_at IS NULL")
            .bind(id.as_str()).fetch_optional(&self.db).await?;
        match row {
            Some(row) => Ok(Some(self.populate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_cheapest_in_stock(&self, product_id: &ProductId) -> Result<Option<Variant>> {
        let row = sqlx::query_as::<_, VariantRow>(
            "SELECT * FROM variants WHERE product_id = $1 AND deleted_at IS NULL AND stock > 0 \
             ORDER BY NULLIF(special_price, 0) ASC NULLS LAST, mrp ASC LIMIT 1",
        )
        .bind(product_id.as_str()).fetch_optional(&self.db).await?;
        match row {
            Some(row) => Ok(Some(self.populate(row).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn count_by_user_and_coupon_excluding_statuses(
        &self,
        user_id: &str,
        code: &CouponCode,
        excluded: &[OrderStatus],
    ) -> Result<u64> {
        let excluded: Vec<String> = excluded.iter().map(|s| s.as_str().to_string()).collect();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND coupon_code = $2 AND status <> ALL($3)")
            .bind(user_id).bind(code.as_str()).bind(&excluded).fetch_one(&self.db).await?;
        Ok(u64::try_from(count.0).unwrap_or(0))
    }
}
