//! Cart snapshot submitted with a coupon

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ProductId, VariantId};

/// One cart line as supplied by the caller. `price` is the authoritative unit price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub qty: u32,
    #[serde(default)]
    pub price: Decimal,
}

impl CartLineItem {
    pub fn new(product_id: impl Into<ProductId>, variant_id: Option<VariantId>, qty: u32, price: Decimal) -> Self {
        Self { product_id: product_id.into(), variant_id, qty, price }
    }
    /// `price * qty`, `None` when it does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> { self.price.checked_mul(Decimal::from(self.qty)) }
}

#[derive(Clone, Debug, Default)]
pub struct Cart { items: Vec<CartLineItem> }

impl Cart {
    /// Normalizes caller-supplied lines. Blank variant ids are dropped, negative prices
    /// and carts whose total overflows are rejected.
    pub fn from_lines(lines: Vec<CartLineItem>) -> Result<Self, CartError> {
        let mut items = Vec::with_capacity(lines.len());
        for mut line in lines {
            if line.product_id.as_str().is_empty() { return Err(CartError::MissingProduct); }
            if line.price < Decimal::ZERO { return Err(CartError::NegativePrice); }
            line.variant_id = line.variant_id.filter(|v| !v.as_str().is_empty());
            items.push(line);
        }
        Self::subtotal_of(&items).ok_or(CartError::OutOfRange)?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CartLineItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Sum of `price * qty` over the given lines, `None` on overflow.
    pub fn subtotal_of<'a>(lines: impl IntoIterator<Item = &'a CartLineItem>) -> Option<Decimal> {
        lines.into_iter().try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Cart item is missing productId")]
    MissingProduct,
    #[error("Cart item price must not be negative")]
    NegativePrice,
    #[error("cart total out of range")]
    OutOfRange,
}
