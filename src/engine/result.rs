//! Evaluation response model.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{DiscountTier, DiscountType, FreeItemTarget, ProductVariantBundle};
use crate::domain::value_objects::{ProductId, VariantId};

/// Why a coupon does not apply. These are normal outcomes, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IneligibleReason {
    TotalLimitReached,
    PerUserLimitReached,
    ProductsNotInCart,
    VariantsNotInCart,
    FreeItemUnavailable,
    FreeItemOutOfStock,
    FreeItemInsufficient { available: u32 },
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalLimitReached => f.write_str("Coupon usage limit reached"),
            Self::PerUserLimitReached => f.write_str("You have reached the usage limit for this coupon"),
            Self::ProductsNotInCart => f.write_str("Targets specific products not in cart"),
            Self::VariantsNotInCart => f.write_str("Targets specific variants not in cart"),
            Self::FreeItemUnavailable => f.write_str("Free item not available"),
            Self::FreeItemOutOfStock => f.write_str("Free item out of stock"),
            Self::FreeItemInsufficient { available } => write!(f, "Only {} pcs available for the free item", available),
        }
    }
}

pub const ELIGIBLE_REASON: &str = "OK";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationMode { Ineligible, FreeItem, Money }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoneyDiscount {
    pub applies: bool,
    #[serde(rename = "type")]
    pub kind: Option<DiscountType>,
    pub amount: Decimal,
    pub applied: Decimal,
    pub base: Decimal,
}

impl MoneyDiscount {
    pub fn none() -> Self {
        Self { applies: false, kind: None, amount: Decimal::ZERO, applied: Decimal::ZERO, base: Decimal::ZERO }
    }

    /// `None` when the discount on `base` does not fit in a `Decimal`.
    pub fn computed(tier: DiscountTier, base: Decimal) -> Option<Self> {
        let applied = tier.apply_to(base)?;
        Some(Self { applies: applied > Decimal::ZERO, kind: Some(tier.kind), amount: tier.amount, applied, base })
    }

    /// Cash value of a granted free item, kept for cart-total bookkeeping.
    pub fn free_item_value(unit_price: Decimal, qty: u32) -> Option<Self> {
        let value = unit_price.checked_mul(Decimal::from(qty))?;
        Some(Self { applies: value > Decimal::ZERO, kind: None, amount: unit_price, applied: value, base: value })
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeItemReport {
    pub exists: bool,
    pub eligible: bool,
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_add_to_cart: Option<bool>,
}

impl FreeItemReport {
    pub fn absent() -> Self { Self::default() }

    /// Configured target before any catalog lookup.
    pub fn for_target(target: &FreeItemTarget, qty: u32) -> Self {
        let (product_id, variant_id) = match target {
            FreeItemTarget::Variant(v) => (None, Some(v.clone())),
            FreeItemTarget::Product(p) => (Some(p.clone()), None),
        };
        Self { exists: true, product_id, variant_id, qty, ..Self::default() }
    }

    pub fn for_bundle(bundle: &ProductVariantBundle, qty: u32, eligible: bool) -> Self {
        Self {
            exists: true,
            eligible,
            product_id: Some(bundle.product_id.clone()),
            variant_id: bundle.variant_id.clone(),
            qty,
            available_qty: Some(bundle.stock),
            unit_price: Some(bundle.unit_price),
            product_name: Some(bundle.product_name.clone()),
            variant_name: bundle.variant_name.clone(),
            best_image: Some(bundle.best_image.clone()),
            require_add_to_cart: eligible.then_some(true),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reason: String,
    pub mode: EvaluationMode,
    pub money_discount: MoneyDiscount,
    pub free_item: FreeItemReport,
}

impl EligibilityResult {
    pub fn ineligible(reason: IneligibleReason, free_item: FreeItemReport) -> Self {
        Self {
            eligible: false,
            reason: reason.to_string(),
            mode: EvaluationMode::Ineligible,
            money_discount: MoneyDiscount::none(),
            free_item: FreeItemReport { eligible: false, require_add_to_cart: None, ..free_item },
        }
    }

    pub fn money(discount: MoneyDiscount) -> Self {
        Self {
            eligible: true,
            reason: ELIGIBLE_REASON.to_string(),
            mode: EvaluationMode::Money,
            money_discount: discount,
            free_item: FreeItemReport::absent(),
        }
    }

    pub fn free_item(bundle: &ProductVariantBundle, qty: u32) -> Option<Self> {
        Some(Self {
            eligible: true,
            reason: ELIGIBLE_REASON.to_string(),
            mode: EvaluationMode::FreeItem,
            money_discount: MoneyDiscount::free_item_value(bundle.unit_price, qty)?,
            free_item: FreeItemReport::for_bundle(bundle, qty, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(IneligibleReason::FreeItemInsufficient { available: 2 }.to_string(), "Only 2 pcs available for the free item");
        assert_eq!(IneligibleReason::ProductsNotInCart.to_string(), "Targets specific products not in cart");
    }

    #[test]
    fn test_ineligible_shape() {
        let result = EligibilityResult::ineligible(IneligibleReason::VariantsNotInCart, FreeItemReport::absent());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["eligible"], false);
        assert_eq!(json["mode"], "ineligible");
        assert_eq!(json["moneyDiscount"]["applies"], false);
        assert!(json["moneyDiscount"]["type"].is_null());
        assert_eq!(json["freeItem"]["exists"], false);
        assert!(json["freeItem"].get("availableQty").is_none());
    }

    #[test]
    fn test_money_shape() {
        let tier = DiscountTier::new(DiscountType::Percentage, Decimal::from(10));
        let json = serde_json::to_value(EligibilityResult::money(MoneyDiscount::computed(tier, Decimal::from(2000)).unwrap())).unwrap();
        assert_eq!(json["mode"], "money");
        assert_eq!(json["moneyDiscount"]["type"], "percentage");
        assert_eq!(json["moneyDiscount"]["applied"].as_f64(), Some(200.0));
        assert_eq!(json["moneyDiscount"]["base"].as_f64(), Some(2000.0));
    }
}
