//! Per-customer redemption limits.

use crate::domain::aggregates::{Coupon, OrderStatus};
use crate::engine::result::IneligibleReason;
use crate::repository::OrderRepository;
use crate::{CouponError, Result};

/// Anonymous callers are refused outright when the coupon limits usage per customer.
pub async fn check_per_user_limit<R>(repo: &R, coupon: &Coupon, user_id: Option<&str>) -> Result<Option<IneligibleReason>>
where
    R: OrderRepository + ?Sized,
{
    if !coupon.limits_per_user() { return Ok(None); }
    let user_id = user_id.map(str::trim).filter(|u| !u.is_empty()).ok_or(CouponError::AuthRequired)?;

    let used = repo
        .count_by_user_and_coupon_excluding_statuses(user_id, coupon.code(), &OrderStatus::TERMINAL_FAILURES)
        .await?;
    tracing::debug!(used, limit = coupon.per_user_limit(), "per-user coupon usage");
    Ok((used >= u64::from(coupon.per_user_limit())).then_some(IneligibleReason::PerUserLimitReached))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{CouponMode, DiscountTier, DiscountType, TierSwitch};
    use crate::domain::value_objects::CouponCode;
    use crate::repository::MemoryStore;
    use rust_decimal::Decimal;

    fn coupon(per_user_limit: u32) -> Coupon {
        let tier = DiscountTier::new(DiscountType::Fixed, Decimal::from(50));
        Coupon::new(CouponCode::new("ONCE").unwrap(), CouponMode::Monetary { tier, switch: TierSwitch::default() })
            .with_limits(0, per_user_limit)
    }

    #[tokio::test]
    async fn test_unlimited_skips_identity() {
        let store = MemoryStore::new();
        assert_eq!(check_per_user_limit(&store, &coupon(0), None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_anonymous_caller_requires_auth() {
        let store = MemoryStore::new();
        let err = check_per_user_limit(&store, &coupon(1), None).await.unwrap_err();
        assert!(matches!(err, CouponError::AuthRequired));
    }

    #[tokio::test]
    async fn test_failed_orders_do_not_count() {
        let store = MemoryStore::new();
        let code = CouponCode::new("ONCE").unwrap();
        store.insert_order("u1", code.clone(), OrderStatus::Cancelled).unwrap();
        store.insert_order("u1", code.clone(), OrderStatus::InvalidPayment).unwrap();
        store.insert_order("u2", code.clone(), OrderStatus::Delivered).unwrap();
        assert_eq!(check_per_user_limit(&store, &coupon(1), Some("u1")).await.unwrap(), None);

        store.insert_order("u1", code, OrderStatus::Pending).unwrap();
        assert_eq!(
            check_per_user_limit(&store, &coupon(1), Some("u1")).await.unwrap(),
            Some(IneligibleReason::PerUserLimitReached)
        );
    }
}
