//! Catalog records read for free-item resolution

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::value_objects::{ProductId, VariantId};

/// Image shown when neither the variant nor the product carries one.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

#[derive(Clone, Debug, Default)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub mrp: Decimal,
    pub special_price: Option<Decimal>,
    pub stock: i64,
    pub has_variants: bool,
    pub images: Vec<String>,
    pub hero_image: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub mrp: Decimal,
    pub special_price: Option<Decimal>,
    pub stock: i64,
    pub images: Vec<String>,
    pub swatch_image: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Parent product, populated by the repository.
    pub product: Option<Product>,
}

/// Special price when it is set and positive, MRP otherwise.
fn selling_price(mrp: Decimal, special_price: Option<Decimal>) -> Decimal {
    special_price.filter(|p| *p > Decimal::ZERO).unwrap_or(mrp)
}

impl Product {
    pub fn unit_price(&self) -> Decimal { selling_price(self.mrp, self.special_price) }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

impl Variant {
    pub fn unit_price(&self) -> Decimal { selling_price(self.mrp, self.special_price) }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
    pub fn in_stock(&self) -> bool { self.stock > 0 }

    /// Live parent product, if populated and not soft-deleted.
    pub fn live_product(&self) -> Option<&Product> {
        self.product.as_ref().filter(|p| !p.is_deleted())
    }
}

/// Ordering used to pick the cheapest variant: special price ascending with
/// missing prices last, then MRP ascending.
pub fn cheapest_first(a: &Variant, b: &Variant) -> std::cmp::Ordering {
    let special = |v: &Variant| v.special_price.filter(|p| *p > Decimal::ZERO);
    match (special(a), special(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
    .then_with(|| a.mrp.cmp(&b.mrp))
}

/// Picks the first non-empty image from candidates listed in priority order.
pub fn best_image<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string()
}

/// A product or variant resolved with live price and stock.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductVariantBundle {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub unit_price: Decimal,
    pub best_image: String,
    pub stock: u32,
}

impl ProductVariantBundle {
    pub fn from_variant(product: &Product, variant: &Variant) -> Self {
        let image = best_image([
            variant.images.first().map(String::as_str),
            variant.swatch_image.as_deref(),
            product.images.first().map(String::as_str),
            product.hero_image.as_deref(),
        ]);
        Self {
            product_id: product.id.clone(),
            variant_id: Some(variant.id.clone()),
            product_name: product.name.clone(),
            variant_name: Some(variant.name.clone()).filter(|n| !n.is_empty()),
            unit_price: variant.unit_price(),
            best_image: image,
            stock: clamp_stock(variant.stock),
        }
    }

    pub fn from_product(product: &Product) -> Self {
        let image = best_image([product.images.first().map(String::as_str), product.hero_image.as_deref()]);
        Self {
            product_id: product.id.clone(),
            variant_id: None,
            product_name: product.name.clone(),
            variant_name: None,
            unit_price: product.unit_price(),
            best_image: image,
            stock: clamp_stock(product.stock),
        }
    }

    /// A product with variants but none in stock.
    pub fn sold_out(product: &Product) -> Self {
        Self { stock: 0, ..Self::from_product(product) }
    }

    pub fn in_stock(&self) -> bool { self.stock > 0 }
}

fn clamp_stock(stock: i64) -> u32 { u32::try_from(stock.max(0)).unwrap_or(u32::MAX) }
