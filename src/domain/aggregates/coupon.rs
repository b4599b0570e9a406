//! Coupon Aggregate

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CouponCode, ProductId, VariantId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType { Percentage, Fixed }

impl DiscountType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percentage => "percentage", Self::Fixed => "fixed" }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A discount type and amount pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscountTier { pub kind: DiscountType, pub amount: Decimal }

impl DiscountTier {
    pub fn new(kind: DiscountType, amount: Decimal) -> Self { Self { kind, amount } }

    /// Discount granted on `base`. Percentages are floored to whole units and
    /// fixed amounts never exceed the base. `None` when the percentage overflows.
    pub fn apply_to(&self, base: Decimal) -> Option<Decimal> {
        let applied = match self.kind {
            DiscountType::Percentage => (base.checked_mul(self.amount)? / Decimal::ONE_HUNDRED).floor(),
            DiscountType::Fixed => base.min(self.amount),
        };
        Some(applied.max(Decimal::ZERO))
    }
}

/// Secondary tier that takes over once the coupon has been redeemed `after_usage` times.
///
/// Either half may be missing, in which case the base tier's value is kept for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TierSwitch {
    pub after_usage: u32,
    pub kind: Option<DiscountType>,
    pub amount: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreeItemTarget { Variant(VariantId), Product(ProductId) }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouponMode {
    Monetary { tier: DiscountTier, switch: TierSwitch },
    FreeItem { target: FreeItemTarget, qty: u32 },
}

impl CouponMode {
    /// Free-item configuration wins over any monetary fields; a variant target wins over a product one.
    pub fn resolve(
        tier: DiscountTier,
        switch: TierSwitch,
        free_product: Option<ProductId>,
        free_variant: Option<VariantId>,
        free_qty: u32,
    ) -> Self {
        let target = match (free_variant, free_product) {
            (Some(variant), _) => Some(FreeItemTarget::Variant(variant)),
            (None, Some(product)) => Some(FreeItemTarget::Product(product)),
            (None, None) => None,
        };
        match target {
            Some(target) => Self::FreeItem { target, qty: free_qty.max(1) },
            None => Self::Monetary { tier, switch },
        }
    }
    pub fn is_free_item(&self) -> bool { matches!(self, Self::FreeItem { .. }) }
}

/// Which cart lines a coupon applies to.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Targeting {
    #[default]
    Global,
    Products(HashSet<ProductId>),
    Variants(HashSet<VariantId>),
}

impl Targeting {
    /// Product targeting takes precedence when both sets are populated.
    pub fn from_sets(
        products: impl IntoIterator<Item = ProductId>,
        variants: impl IntoIterator<Item = VariantId>,
    ) -> Self {
        let products: HashSet<_> = products.into_iter().collect();
        if !products.is_empty() { return Self::Products(products); }
        let variants: HashSet<_> = variants.into_iter().collect();
        if !variants.is_empty() { return Self::Variants(variants); }
        Self::Global
    }
}

#[derive(Clone, Debug)]
pub struct Coupon {
    code: CouponCode,
    mode: CouponMode,
    targeting: Targeting,
    redemptions_total: u32,
    total_limit: u32,
    per_user_limit: u32,
    deleted_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn new(code: CouponCode, mode: CouponMode) -> Self {
        Self {
            code, mode, targeting: Targeting::Global, redemptions_total: 0,
            total_limit: 0, per_user_limit: 0, deleted_at: None,
        }
    }

    pub fn with_targeting(mut self, targeting: Targeting) -> Self { self.targeting = targeting; self }
    pub fn with_redemptions(mut self, total: u32) -> Self { self.redemptions_total = total; self }
    pub fn with_limits(mut self, total_limit: u32, per_user_limit: u32) -> Self {
        self.total_limit = total_limit;
        self.per_user_limit = per_user_limit;
        self
    }
    pub fn with_deleted_at(mut self, deleted_at: Option<DateTime<Utc>>) -> Self { self.deleted_at = deleted_at; self }

    pub fn code(&self) -> &CouponCode { &self.code }
    pub fn mode(&self) -> &CouponMode { &self.mode }
    pub fn targeting(&self) -> &Targeting { &self.targeting }
    pub fn redemptions_total(&self) -> u32 { self.redemptions_total }
    pub fn total_limit(&self) -> u32 { self.total_limit }
    pub fn per_user_limit(&self) -> u32 { self.per_user_limit }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

    /// Global redemption limit reached (`0` means unlimited).
    pub fn is_exhausted(&self) -> bool {
        self.total_limit > 0 && self.redemptions_total >= self.total_limit
    }

    pub fn limits_per_user(&self) -> bool { self.per_user_limit > 0 }

    /// Tier in force right now, after any usage-triggered switch. `None` in free-item mode.
    pub fn effective_tier(&self) -> Option<DiscountTier> {
        let CouponMode::Monetary { tier, switch } = &self.mode else { return None };
        let switched = switch.after_usage > 0 && self.redemptions_total >= switch.after_usage;
        if !switched { return Some(*tier); }
        Some(DiscountTier {
            kind: switch.kind.unwrap_or(tier.kind),
            amount: switch.amount.unwrap_or(tier.amount),
        })
    }
}
