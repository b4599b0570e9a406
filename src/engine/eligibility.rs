//! Cart targeting.

use crate::domain::aggregates::{Cart, CartLineItem, Targeting};
use crate::engine::result::IneligibleReason;

#[derive(Debug, PartialEq)]
pub enum Eligibility<'a> {
    /// Every cart line the coupon applies to.
    Matched(Vec<&'a CartLineItem>),
    NotMatched(IneligibleReason),
}

pub fn resolve<'a>(targeting: &Targeting, cart: &'a Cart) -> Eligibility<'a> {
    let (matched, reason): (Vec<_>, _) = match targeting {
        Targeting::Global => return Eligibility::Matched(cart.items().iter().collect()),
        Targeting::Products(products) => (
            cart.items().iter().filter(|line| products.contains(&line.product_id)).collect(),
            IneligibleReason::ProductsNotInCart,
        ),
        Targeting::Variants(variants) => (
            cart.items()
                .iter()
                .filter(|line| line.variant_id.as_ref().is_some_and(|v| variants.contains(v)))
                .collect(),
            IneligibleReason::VariantsNotInCart,
        ),
    };
    if matched.is_empty() { Eligibility::NotMatched(reason) } else { Eligibility::Matched(matched) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ProductId, VariantId};
    use rust_decimal::Decimal;

    fn cart() -> Cart {
        Cart::from_lines(vec![
            CartLineItem::new("P1", Some(VariantId::from("V1")), 1, Decimal::from(500)),
            CartLineItem::new("P2", None, 1, Decimal::from(9999)),
            CartLineItem::new("P1", Some(VariantId::from("V2")), 2, Decimal::from(450)),
        ]).unwrap()
    }

    #[test]
    fn test_global_matches_whole_cart() {
        let cart = cart();
        assert!(matches!(resolve(&Targeting::Global, &cart), Eligibility::Matched(lines) if lines.len() == 3));
    }

    #[test]
    fn test_product_targeting_collects_every_matching_line() {
        let cart = cart();
        let targeting = Targeting::from_sets(vec![ProductId::from("P1")], Vec::new());
        let Eligibility::Matched(lines) = resolve(&targeting, &cart) else { panic!("expected a match") };
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.product_id.as_str() == "P1"));
    }

    #[test]
    fn test_variant_targeting_ignores_lines_without_variant() {
        let cart = cart();
        let targeting = Targeting::from_sets(Vec::new(), vec![VariantId::from("V2")]);
        let Eligibility::Matched(lines) = resolve(&targeting, &cart) else { panic!("expected a match") };
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 2);

        let missing = Targeting::from_sets(Vec::new(), vec![VariantId::from("V9")]);
        assert_eq!(resolve(&missing, &cart), Eligibility::NotMatched(IneligibleReason::VariantsNotInCart));
    }

    #[test]
    fn test_products_win_over_variants() {
        let cart = cart();
        let targeting = Targeting::from_sets(vec![ProductId::from("P9")], vec![VariantId::from("V1")]);
        assert_eq!(resolve(&targeting, &cart), Eligibility::NotMatched(IneligibleReason::ProductsNotInCart));
    }
}
