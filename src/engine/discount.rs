//! Discount computation for monetary and free-item coupons.

use crate::domain::aggregates::{Cart, CartError, CartLineItem, DiscountTier, FreeItemTarget, ProductVariantBundle};
use crate::engine::result::{EligibilityResult, FreeItemReport, IneligibleReason, MoneyDiscount};
use crate::repository::{ProductRepository, VariantRepository};
use crate::{CouponError, Result};

fn out_of_range() -> CouponError { CouponError::Validation(CartError::OutOfRange.to_string()) }

/// Monetary discount over the matched lines only.
pub fn money_discount(tier: DiscountTier, matched: &[&CartLineItem]) -> Result<EligibilityResult> {
    let base = Cart::subtotal_of(matched.iter().copied()).ok_or_else(out_of_range)?;
    let discount = MoneyDiscount::computed(tier, base).ok_or_else(out_of_range)?;
    Ok(EligibilityResult::money(discount))
}

/// Resolves the free item against the live catalog. `None` when it no longer exists.
pub async fn resolve_bundle<R>(repo: &R, target: &FreeItemTarget) -> Result<Option<ProductVariantBundle>>
where
    R: ProductRepository + VariantRepository + ?Sized,
{
    match target {
        FreeItemTarget::Variant(id) => {
            let Some(variant) = VariantRepository::find_by_id(repo, id).await? else { return Ok(None) };
            Ok(variant.live_product().map(|product| ProductVariantBundle::from_variant(product, &variant)))
        }
        FreeItemTarget::Product(id) => {
            let Some(product) = ProductRepository::find_by_id(repo, id).await? else { return Ok(None) };
            if !product.has_variants {
                return Ok(Some(ProductVariantBundle::from_product(&product)));
            }
            let bundle = match repo.find_cheapest_in_stock(&product.id).await? {
                Some(variant) => ProductVariantBundle::from_variant(&product, &variant),
                None => ProductVariantBundle::sold_out(&product),
            };
            Ok(Some(bundle))
        }
    }
}

/// Stock checks for a resolved free item. Fails only when the catalog price times
/// `qty` does not fit in a `Decimal`.
pub fn free_item_result(target: &FreeItemTarget, bundle: Option<ProductVariantBundle>, qty: u32) -> Result<EligibilityResult> {
    let Some(bundle) = bundle else {
        return Ok(EligibilityResult::ineligible(IneligibleReason::FreeItemUnavailable, FreeItemReport::for_target(target, qty)));
    };
    if !bundle.in_stock() {
        return Ok(EligibilityResult::ineligible(IneligibleReason::FreeItemOutOfStock, FreeItemReport::for_bundle(&bundle, qty, false)));
    }
    if qty > bundle.stock {
        let reason = IneligibleReason::FreeItemInsufficient { available: bundle.stock };
        return Ok(EligibilityResult::ineligible(reason, FreeItemReport::for_bundle(&bundle, qty, false)));
    }
    EligibilityResult::free_item(&bundle, qty)
        .ok_or_else(|| CouponError::Storage(format!("free item {} value out of range", bundle.product_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{DiscountType, Product, Variant};
    use crate::domain::value_objects::{ProductId, VariantId};
    use crate::engine::result::EvaluationMode;
    use crate::repository::MemoryStore;
    use rust_decimal::Decimal;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_product(Product {
            id: ProductId::from("TEE"), name: "Tee".into(), mrp: Decimal::from(800), has_variants: true,
            images: vec!["/tee.png".into()], ..Default::default()
        }).unwrap();
        for (id, mrp, special, stock) in [("TEE-S", 800, Some(600), 0), ("TEE-M", 800, Some(650), 4), ("TEE-L", 700, None, 9)] {
            store.insert_variant(Variant {
                id: VariantId::from(id), product_id: ProductId::from("TEE"), name: id.into(),
                mrp: Decimal::from(mrp), special_price: special.map(Decimal::from), stock, ..Default::default()
            }).unwrap();
        }
        store.insert_product(Product {
            id: ProductId::from("MUG"), name: "Mug".into(), mrp: Decimal::from(300), stock: 2, ..Default::default()
        }).unwrap();
        store
    }

    #[test]
    fn test_money_discount_uses_matched_base() {
        let a = CartLineItem::new("P1", None, 1, Decimal::from(500));
        let tier = DiscountTier::new(DiscountType::Fixed, Decimal::from(800));
        let result = money_discount(tier, &[&a]).unwrap();
        assert_eq!(result.money_discount.base, Decimal::from(500));
        assert_eq!(result.money_discount.applied, Decimal::from(500));
        assert!(result.money_discount.applies);
    }

    #[test]
    fn test_zero_discount_does_not_apply() {
        let a = CartLineItem::new("P1", None, 0, Decimal::from(500));
        let tier = DiscountTier::new(DiscountType::Percentage, Decimal::from(10));
        let result = money_discount(tier, &[&a]).unwrap();
        assert!(result.eligible);
        assert!(!result.money_discount.applies);
    }

    #[tokio::test]
    async fn test_product_picks_cheapest_in_stock_variant() {
        let bundle = resolve_bundle(&store(), &FreeItemTarget::Product(ProductId::from("TEE"))).await.unwrap().unwrap();
        assert_eq!(bundle.variant_id, Some(VariantId::from("TEE-M")));
        assert_eq!(bundle.unit_price, Decimal::from(650));
        assert_eq!(bundle.best_image, "/tee.png");
    }

    #[tokio::test]
    async fn test_product_with_every_variant_sold_out() {
        let store = store();
        store.insert_product(Product {
            id: ProductId::from("SOCK"), name: "Sock".into(), mrp: Decimal::from(150), has_variants: true, stock: 40,
            ..Default::default()
        }).unwrap();
        for id in ["SOCK-S", "SOCK-L"] {
            store.insert_variant(Variant {
                id: VariantId::from(id), product_id: ProductId::from("SOCK"), mrp: Decimal::from(150), stock: 0,
                ..Default::default()
            }).unwrap();
        }
        let target = FreeItemTarget::Product(ProductId::from("SOCK"));
        let result = free_item_result(&target, resolve_bundle(&store, &target).await.unwrap(), 1).unwrap();
        assert!(!result.eligible);
        assert_eq!(result.mode, EvaluationMode::Ineligible);
        assert_eq!(result.reason, "Free item out of stock");
        assert_eq!(result.free_item.available_qty, Some(0));
        assert_eq!(result.free_item.variant_id, None);
        assert_eq!(result.free_item.product_id, Some(ProductId::from("SOCK")));
    }

    #[test]
    fn test_money_discount_overflow_is_rejected() {
        let a = CartLineItem::new("P1", None, 1, Decimal::MAX);
        let tier = DiscountTier::new(DiscountType::Percentage, Decimal::from(10));
        let err = money_discount(tier, &[&a]).unwrap_err();
        assert!(matches!(err, CouponError::Validation(ref msg) if msg == "cart total out of range"));
    }

    #[tokio::test]
    async fn test_product_without_variants_uses_own_stock() {
        let bundle = resolve_bundle(&store(), &FreeItemTarget::Product(ProductId::from("MUG"))).await.unwrap().unwrap();
        assert_eq!(bundle.variant_id, None);
        assert_eq!(bundle.stock, 2);
    }

    #[tokio::test]
    async fn test_variant_with_deleted_parent_is_unavailable() {
        let store = store();
        store.insert_variant(Variant { id: VariantId::from("ORPHAN"), product_id: ProductId::from("NOPE"), stock: 5, ..Default::default() }).unwrap();
        let target = FreeItemTarget::Variant(VariantId::from("ORPHAN"));
        let result = free_item_result(&target, resolve_bundle(&store, &target).await.unwrap(), 1).unwrap();
        assert_eq!(result.reason, "Free item not available");
        assert!(result.free_item.exists);
    }

    #[tokio::test]
    async fn test_free_item_quantity_checked_against_stock() {
        let target = FreeItemTarget::Product(ProductId::from("MUG"));
        let bundle = resolve_bundle(&store(), &target).await.unwrap();

        let short = free_item_result(&target, bundle.clone(), 3).unwrap();
        assert!(!short.eligible);
        assert_eq!(short.reason, "Only 2 pcs available for the free item");
        assert_eq!(short.free_item.available_qty, Some(2));

        let granted = free_item_result(&target, bundle, 2).unwrap();
        assert_eq!(granted.mode, EvaluationMode::FreeItem);
        assert_eq!(granted.money_discount.applied, Decimal::from(600));
        assert_eq!(granted.free_item.require_add_to_cart, Some(true));
    }
}
