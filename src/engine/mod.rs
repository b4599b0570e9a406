//! Coupon evaluation engine.
//!
//! Runs four stages in order and stops at the first one that rejects the coupon:
//! lookup, per-customer usage, cart targeting, then discount computation.
//! Nothing is written; redemption counters and stock are snapshots.

pub mod discount;
pub mod eligibility;
pub mod lookup;
pub mod result;
pub mod usage;

pub use result::{EligibilityResult, EvaluationMode, FreeItemReport, IneligibleReason, MoneyDiscount};

use std::sync::Arc;

use tracing::{debug, Span};
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartLineItem, CouponMode};
use crate::domain::value_objects::{CouponCode, CouponCodeError};
use crate::repository::Store;
use crate::{CouponError, Result};
use eligibility::Eligibility;

#[derive(Clone)]
pub struct CouponEngine { store: Arc<dyn Store> }

impl CouponEngine {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    /// Decides whether `code` applies to `items` for the given caller.
    ///
    /// Business outcomes come back as `Ok` with `eligible: false`. Errors are
    /// reserved for bad input, unknown coupons, missing identity and storage failures.
    #[tracing::instrument(
        skip(self, code, items, user_id),
        fields(evaluation_id = %Uuid::now_v7(), code = tracing::field::Empty, authenticated = user_id.is_some())
    )]
    pub async fn evaluate(&self, code: &str, items: Vec<CartLineItem>, user_id: Option<&str>) -> Result<EligibilityResult> {
        let code = CouponCode::new(code).map_err(|e| match e {
            CouponCodeError::TooLong => CouponError::NotFound,
            CouponCodeError::Empty => CouponError::Validation(e.to_string()),
        })?;
        Span::current().record("code", code.as_str());
        let cart = Cart::from_lines(items).map_err(|e| CouponError::Validation(e.to_string()))?;
        let store = self.store.as_ref();

        let coupon = lookup::find_coupon(store, &code).await?;
        let free_item_exists = coupon.mode().is_free_item();
        let absent = || match coupon.mode() {
            CouponMode::FreeItem { target, qty } => FreeItemReport::for_target(target, *qty),
            CouponMode::Monetary { .. } => FreeItemReport::absent(),
        };

        if let Some(reason) = lookup::check_total_limit(&coupon) {
            debug!(%reason, redemptions = coupon.redemptions_total(), "coupon exhausted");
            return Ok(EligibilityResult::ineligible(reason, absent()));
        }
        if let Some(reason) = usage::check_per_user_limit(store, &coupon, user_id).await? {
            debug!(%reason, "per-user limit reached");
            return Ok(EligibilityResult::ineligible(reason, absent()));
        }

        let matched = match eligibility::resolve(coupon.targeting(), &cart) {
            Eligibility::Matched(lines) => lines,
            Eligibility::NotMatched(reason) => {
                debug!(%reason, "cart does not match coupon targeting");
                return Ok(EligibilityResult::ineligible(reason, absent()));
            }
        };

        let result = match coupon.mode() {
            CouponMode::FreeItem { target, qty } => {
                let bundle = discount::resolve_bundle(store, target).await?;
                discount::free_item_result(target, bundle, *qty)?
            }
            CouponMode::Monetary { .. } => {
                let Some(tier) = coupon.effective_tier() else {
                    return Err(CouponError::Storage(format!("coupon {} has no discount tier", code)));
                };
                discount::money_discount(tier, &matched)?
            }
        };
        debug!(eligible = result.eligible, mode = ?result.mode, free_item_exists, reason = %result.reason, "coupon evaluated");
        Ok(result)
    }
}
