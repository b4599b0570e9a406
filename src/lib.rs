//! OpenSASE Coupons
//!
//! Coupon evaluation for the OpenSASE storefront.
//!
//! ## Features
//! - Case-insensitive coupon lookup with soft-delete and global limits
//! - Per-customer redemption limits
//! - Product, variant or store-wide targeting
//! - Percentage and fixed discounts with a usage-triggered tier switch
//! - Free-item coupons resolved against live catalog stock
//!
//! Evaluation is read-only: redemption counters and stock are owned by the
//! checkout flow and are never written here.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;

use thiserror::Error;

pub use engine::{CouponEngine, EligibilityResult, EvaluationMode};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CouponError {
    #[error("{0}")]
    Validation(String),

    #[error("Coupon not found")]
    NotFound,

    #[error("Login required to use this coupon")]
    AuthRequired,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for CouponError {
    fn from(err: sqlx::Error) -> Self { Self::Storage(err.to_string()) }
}

pub type Result<T> = std::result::Result<T, CouponError>;
