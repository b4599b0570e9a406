//! Aggregates module
pub mod coupon;
pub mod cart;
pub mod product;
pub mod order;

pub use coupon::{Coupon, CouponMode, DiscountTier, DiscountType, FreeItemTarget, Targeting, TierSwitch};
pub use cart::{Cart, CartError, CartLineItem};
pub use product::{Product, ProductVariantBundle, Variant, PLACEHOLDER_IMAGE};
pub use order::OrderStatus;
