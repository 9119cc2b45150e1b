//! Fixtures
//!
//! An in-memory [`Catalog`] stocked with the demo product range and its
//! promotions, for the demo driver and the integration tests.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::USD};

use crate::{
    catalog::Catalog,
    products::{Product, ProductError},
    promotions::{ItemSnapshot, Promotion},
};

/// Catalog holding the demo product range.
#[derive(Debug)]
pub struct SampleCatalog {
    products: FxHashMap<String, Product>,
    promotions: FxHashMap<String, Vec<Promotion>>,
}

impl SampleCatalog {
    /// Build the demo catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if a product price is rejected.
    pub fn new() -> Result<Self, ProductError> {
        let range = [
            Product::new("ipd", "Super iPad", Money::from_minor(54_999, USD))?,
            Product::new("mbp", "MacBook Pro", Money::from_minor(139_999, USD))?,
            Product::new("atv", "Apple TV", Money::from_minor(10_950, USD))?,
            Product::new("vga", "VGA adapter", Money::from_minor(3_000, USD))?,
            Product::new("del", "Dell Laptop", Money::from_minor(30_000, USD))?,
        ];

        let products = range
            .into_iter()
            .map(|product| (product.sku().to_string(), product))
            .collect();

        let mut promotions: FxHashMap<String, Vec<Promotion>> = FxHashMap::default();

        promotions.insert("atv".to_string(), vec![three_for_two()]);
        promotions.insert("ipd".to_string(), vec![bulk_ipads()]);
        promotions.insert("vga".to_string(), vec![free_vga_with_mbp()]);

        Ok(Self {
            products,
            promotions,
        })
    }
}

#[async_trait]
impl Catalog for SampleCatalog {
    async fn fetch_product(&self, sku: &str) -> Option<Product> {
        self.products.get(sku).cloned()
    }

    async fn fetch_promotions(&self, sku: &str) -> Option<Vec<Promotion>> {
        self.promotions.get(sku).cloned()
    }
}

/// Buy three Apple TVs, pay for two.
fn three_for_two() -> Promotion {
    Promotion::new("atv-3-for-2", "atv", "3 for 2 Apple TVs", |item, _siblings| {
        let unit = item.product().price();
        let quantity = item.quantity();

        if quantity < 3 {
            return item.full_price();
        }

        let charged = (quantity / 3) * 2 + quantity % 3;

        Money::from_minor(unit.to_minor_units() * charged, unit.currency())
    })
}

/// Super iPads drop to $499.99 each when buying more than four.
fn bulk_ipads() -> Promotion {
    Promotion::new(
        "ipd-bulk-499",
        "ipd",
        "Super iPad bulk discount",
        |item, _siblings| {
            let quantity = item.quantity();

            if quantity <= 4 {
                return item.full_price();
            }

            Money::from_minor(quantity * 49_999, item.product().price().currency())
        },
    )
}

/// One free VGA adapter for every `mbp` unit in the cart.
///
/// With more laptops than adapters the rule prices the line below zero,
/// crediting the surplus against the rest of the cart.
fn free_vga_with_mbp() -> Promotion {
    Promotion::new(
        "vga-free-with-mbp",
        "vga",
        "Free VGA adapter with every MacBook Pro",
        |item, siblings| {
            let unit = item.product().price();
            let laptops: i64 = siblings
                .iter()
                .filter(|sibling| sibling.product().sku() == "mbp")
                .map(ItemSnapshot::quantity)
                .sum();

            Money::from_minor(
                (item.quantity() - laptops) * unit.to_minor_units(),
                unit.currency(),
            )
        },
    )
}
