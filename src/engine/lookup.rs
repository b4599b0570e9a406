//! Coupon lookup by normalized code.

use crate::domain::aggregates::Coupon;
use crate::domain::value_objects::CouponCode;
use crate::engine::result::IneligibleReason;
use crate::repository::CouponRepository;
use crate::{CouponError, Result};

/// Non-deleted coupon for `code`, or `NotFound`.
pub async fn find_coupon<R>(repo: &R, code: &CouponCode) -> Result<Coupon>
where
    R: CouponRepository + ?Sized,
{
    repo.find_active_by_code(code)
        .await?
        .filter(|c| !c.is_deleted())
        .ok_or(CouponError::NotFound)
}

pub fn check_total_limit(coupon: &Coupon) -> Option<IneligibleReason> {
    coupon.is_exhausted().then_some(IneligibleReason::TotalLimitReached)
}
