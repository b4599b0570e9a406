//! Value Objects for coupon evaluation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coupon code value object, compared case-insensitively by storing it uppercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, CouponCodeError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(CouponCodeError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(CouponCodeError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponCodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self { code.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponCodeError {
    #[error("Coupon code is empty")]
    Empty,
    #[error("Coupon code too long")]
    TooLong,
}

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self { Self(value.into().trim().to_string()) }
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self { Self::new(value) }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self { Self::new(value) }
        }
    };
}

catalog_id!(
    /// Catalog product identifier.
    ProductId
);
catalog_id!(
    /// Catalog variant identifier.
    VariantId
);

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_coupon_code_normalized() {
        let code = CouponCode::new("  save10 ").unwrap();
        assert_eq!(code.as_str(), "SAVE10");
        assert_eq!(code, CouponCode::new("SAVE10").unwrap());
    }
    #[test]
    fn test_coupon_code_rejects_blank() {
        assert_eq!(CouponCode::new("   "), Err(CouponCodeError::Empty));
        assert_eq!(CouponCode::new("X".repeat(65)), Err(CouponCodeError::TooLong));
    }
    #[test]
    fn test_ids_compare_by_value() {
        assert_eq!(ProductId::new("p1 "), ProductId::from("p1"));
        assert_ne!(VariantId::from("v1"), VariantId::from("V1"));
    }
}
