//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors related to product construction.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The product price was negative (sku, price in minor units).
    #[error("Product {0} cannot have a negative price ({1} minor units)")]
    NegativePrice(String, i64),
}

/// A catalog product: a sku, a display name and a unit price.
///
/// Products are immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    sku: String,
    name: String,
    price: Money<'static, Currency>,
}

impl Product {
    /// Creates a new product with the given sku, name and unit price.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError::NegativePrice`] if the price is below zero.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
    ) -> Result<Self, ProductError> {
        let sku = sku.into();
        let minor = price.to_minor_units();

        if minor < 0 {
            return Err(ProductError::NegativePrice(sku, minor));
        }

        Ok(Self {
            sku,
            name: name.into(),
            price,
        })
    }

    /// Returns the sku of the product.
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Returns the display name of the product.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price of the product.
    #[must_use]
    pub fn price(&self) -> Money<'static, Currency> {
        self.price
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.name, self.sku, self.price)
    }
}
