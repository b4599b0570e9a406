//! Order statuses relevant to coupon usage

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    InvalidPayment,
    Other(String),
}

impl OrderStatus {
    /// Orders in these states never count towards a customer's coupon usage.
    pub const TERMINAL_FAILURES: [OrderStatus; 2] = [OrderStatus::Cancelled, OrderStatus::InvalidPayment];

    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            "Invalid Payment" => Self::InvalidPayment,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::InvalidPayment => "Invalid Payment",
            Self::Other(s) => s,
        }
    }

    pub fn counts_towards_usage(&self) -> bool { !Self::TERMINAL_FAILURES.contains(self) }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_terminal_failures_excluded() {
        assert!(!OrderStatus::parse("cancelled").counts_towards_usage());
        assert!(!OrderStatus::parse("Invalid Payment").counts_towards_usage());
        assert!(OrderStatus::parse("delivered").counts_towards_usage());
        assert!(OrderStatus::parse("on-hold").counts_towards_usage());
        assert_eq!(OrderStatus::InvalidPayment.to_string(), "Invalid Payment");
    }
}
