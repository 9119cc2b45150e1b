//! Cart items

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    products::Product,
    promotions::{ItemSnapshot, Promotion},
};

/// Errors related to cart item state or price calculation.
#[derive(Debug, Error)]
pub enum CartItemError {
    /// A negative quantity was given for an item (sku, rejected quantity).
    #[error("Cannot set quantity of item {0} to {1}; quantity must not be negative")]
    InvalidQuantity(String, i64),

    /// The sibling lines passed to a price calculation included the item itself.
    #[error("Sibling lines for item {0} must not include the item itself")]
    SelfReference(String),
}

/// One line of a cart: a product, the promotions registered against its sku
/// and the quantity currently in the cart.
///
/// The item id is the sku of its product.
#[derive(Clone, Debug)]
pub struct CartItem {
    product: Product,
    promotions: Vec<Promotion>,
    quantity: i64,
}

impl CartItem {
    /// Creates a new cart item with the given quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartItemError::InvalidQuantity`] if the quantity is below zero.
    pub fn new(
        product: Product,
        promotions: Vec<Promotion>,
        quantity: i64,
    ) -> Result<Self, CartItemError> {
        let mut item = Self {
            product,
            promotions,
            quantity: 0,
        };

        item.set_quantity(quantity)?;

        Ok(item)
    }

    /// The cart item id, which is the sku of its product.
    pub fn id(&self) -> &str {
        self.product.sku()
    }

    /// Returns the product of the item.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the promotions registered against the item's sku.
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Returns the quantity of the item in the cart.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Sets the quantity of the item in the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartItemError::InvalidQuantity`] if the quantity is below
    /// zero. The stored quantity is left unchanged on failure.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), CartItemError> {
        if quantity < 0 {
            return Err(CartItemError::InvalidQuantity(
                self.id().to_string(),
                quantity,
            ));
        }

        self.quantity = quantity;

        Ok(())
    }

    /// The undiscounted price of the line: unit price times quantity.
    #[must_use]
    pub fn full_price(&self) -> Money<'static, Currency> {
        let unit = self.product.price();

        Money::from_minor(unit.to_minor_units() * self.quantity, unit.currency())
    }

    /// A snapshot of this line for handing to pricing rules.
    #[must_use]
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot::new(self.product.clone(), self.quantity)
    }

    /// Calculates the price of this line given snapshots of every other line
    /// in the cart.
    ///
    /// Every attached promotion rule is evaluated and the cheapest candidate
    /// wins. With no promotions attached the full price is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`CartItemError::SelfReference`] if `siblings` contains a
    /// snapshot of this item's own sku.
    pub fn calculate_price(
        &self,
        siblings: &[ItemSnapshot],
    ) -> Result<Money<'static, Currency>, CartItemError> {
        if siblings
            .iter()
            .any(|sibling| sibling.product().sku() == self.id())
        {
            return Err(CartItemError::SelfReference(self.id().to_string()));
        }

        let current = self.snapshot();

        let discounted = self
            .promotions
            .iter()
            .map(|promotion| promotion.apply(&current, siblings))
            .min_by(|a, b| a.to_minor_units().cmp(&b.to_minor_units()));

        Ok(discounted.unwrap_or_else(|| self.full_price()))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    // Fixtures: a $1000.00 MacBook with tiered quantity discounts and a
    // $100.00 Homepod with a cross-sku bundle discount.

    fn mac() -> TestResult<Product> {
        Ok(Product::new(
            "mac",
            "MacBook Pro",
            Money::from_minor(100_000, USD),
        )?)
    }

    fn homepod() -> TestResult<Product> {
        Ok(Product::new(
            "homepod",
            "Homepod",
            Money::from_minor(10_000, USD),
        )?)
    }

    /// 3% off the line when buying three or more.
    fn three_percent_off_at_three() -> Promotion {
        Promotion::new(
            "3-off-mac",
            "mac",
            "3% off on Mac if buy 3 or more",
            |item, _siblings| {
                let full = item.full_price();

                if item.quantity() >= 3 {
                    Money::from_minor(full.to_minor_units() * 97 / 100, USD)
                } else {
                    full
                }
            },
        )
    }

    /// 10% off the line when buying five or more.
    fn ten_percent_off_at_five() -> Promotion {
        Promotion::new(
            "5-off-mac",
            "mac",
            "10% off on Mac if buy 5 or more",
            |item, _siblings| {
                let full = item.full_price();

                if item.quantity() >= 5 {
                    Money::from_minor(full.to_minor_units() * 9 / 10, USD)
                } else {
                    full
                }
            },
        )
    }

    /// Half-price Homepods when the cart holds at least two `mac` units.
    fn half_price_with_two_macs() -> Promotion {
        Promotion::new(
            "homepod-mac-bundle",
            "homepod",
            "50% off on at least 2 Macbooks (mac)",
            |item, siblings| {
                let macs: i64 = siblings
                    .iter()
                    .filter(|sibling| sibling.product().sku() == "mac")
                    .map(ItemSnapshot::quantity)
                    .sum();

                let full = item.full_price();

                if macs >= 2 {
                    Money::from_minor(full.to_minor_units() / 2, USD)
                } else {
                    full
                }
            },
        )
    }

    /// 75% off the line when buying ten or more Homepods.
    fn bulk_homepods() -> Promotion {
        Promotion::new(
            "homepod-bulk",
            "homepod",
            "75% off on at least 10 homepods",
            |item, _siblings| {
                let full = item.full_price();

                if item.quantity() >= 10 {
                    Money::from_minor(full.to_minor_units() / 4, USD)
                } else {
                    full
                }
            },
        )
    }

    #[test]
    fn quantity_is_updatable_and_rejects_negatives() -> TestResult {
        let mut item = CartItem::new(mac()?, vec![], 3)?;

        assert_eq!(item.quantity(), 3);

        item.set_quantity(5)?;
        assert_eq!(item.quantity(), 5);

        let result = item.set_quantity(-1);

        assert!(
            matches!(result, Err(CartItemError::InvalidQuantity(sku, -1)) if sku == "mac"),
            "expected InvalidQuantity error"
        );
        assert_eq!(item.quantity(), 5, "failed update must not change state");

        Ok(())
    }

    #[test]
    fn new_rejects_negative_quantity() -> TestResult {
        let result = CartItem::new(mac()?, vec![], -2);

        assert!(
            matches!(result, Err(CartItemError::InvalidQuantity(sku, -2)) if sku == "mac"),
            "expected InvalidQuantity error"
        );

        Ok(())
    }

    #[test]
    fn price_without_promotions_is_unit_price_times_quantity() -> TestResult {
        let item = CartItem::new(mac()?, vec![], 3)?;

        assert_eq!(item.calculate_price(&[])?, Money::from_minor(300_000, USD));

        Ok(())
    }

    #[test]
    fn price_applies_a_promotion_once_its_threshold_is_met() -> TestResult {
        let mut item = CartItem::new(mac()?, vec![three_percent_off_at_three()], 2)?;

        assert_eq!(item.calculate_price(&[])?, Money::from_minor(200_000, USD));

        item.set_quantity(3)?;

        assert_eq!(item.calculate_price(&[])?, Money::from_minor(291_000, USD));

        Ok(())
    }

    #[test]
    fn price_takes_the_cheapest_of_several_promotions() -> TestResult {
        let promotions = vec![three_percent_off_at_three(), ten_percent_off_at_five()];
        let mut item = CartItem::new(mac()?, promotions, 2)?;

        // Below both thresholds: full price.
        assert_eq!(item.calculate_price(&[])?, Money::from_minor(200_000, USD));

        // Four units: only the 3% discount gates open.
        item.set_quantity(4)?;
        assert_eq!(item.calculate_price(&[])?, Money::from_minor(388_000, USD));

        // Five units: the 10% discount beats the 3% one.
        item.set_quantity(5)?;
        assert_eq!(item.calculate_price(&[])?, Money::from_minor(450_000, USD));

        Ok(())
    }

    #[test]
    fn cross_sku_rules_read_sibling_lines() -> TestResult {
        let mut mac_item = CartItem::new(
            mac()?,
            vec![three_percent_off_at_three(), ten_percent_off_at_five()],
            4,
        )?;

        let mut homepod_item = CartItem::new(
            homepod()?,
            vec![half_price_with_two_macs(), bulk_homepods()],
            2,
        )?;

        let total = |mac_item: &CartItem, homepod_item: &CartItem| -> TestResult<i64> {
            let mac_price = mac_item.calculate_price(&[homepod_item.snapshot()])?;
            let homepod_price = homepod_item.calculate_price(&[mac_item.snapshot()])?;

            Ok(mac_price.to_minor_units() + homepod_price.to_minor_units())
        };

        // Four Macs at 3% off plus two half-price Homepods.
        assert_eq!(total(&mac_item, &homepod_item)?, 398_000);

        // One Mac: no Mac discount, and the Homepod bundle no longer applies.
        mac_item.set_quantity(1)?;
        assert_eq!(total(&mac_item, &homepod_item)?, 120_000);

        // Fifteen Homepods: the bulk discount undercuts the bundle.
        homepod_item.set_quantity(15)?;
        assert_eq!(total(&mac_item, &homepod_item)?, 137_500);

        Ok(())
    }

    #[test]
    fn promotions_never_raise_the_price_above_full() -> TestResult {
        let item = CartItem::new(mac()?, vec![three_percent_off_at_three()], 2)?;
        let full = item.full_price();

        assert!(
            item.calculate_price(&[])?.to_minor_units() <= full.to_minor_units(),
            "a self-gating discount must not exceed full price"
        );

        Ok(())
    }

    #[test]
    fn calculate_price_rejects_self_in_siblings() -> TestResult {
        let item = CartItem::new(mac()?, vec![], 1)?;
        let siblings = [item.snapshot()];

        let result = item.calculate_price(&siblings);

        assert!(
            matches!(result, Err(CartItemError::SelfReference(sku)) if sku == "mac"),
            "expected SelfReference error"
        );

        Ok(())
    }

    #[test]
    fn id_is_the_product_sku() -> TestResult {
        let item = CartItem::new(homepod()?, vec![], 1)?;

        assert_eq!(item.id(), "homepod");

        Ok(())
    }
}
