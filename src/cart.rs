//! Cart

use std::{fmt, slice, sync::Arc};

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::Catalog,
    items::{CartItem, CartItemError},
    promotions::ItemSnapshot,
    receipt::{Receipt, ReceiptLine},
};

/// Errors related to cart state transitions or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// The sku is already in the cart; use `update` or `delete` instead.
    #[error("Item {0} is already in the cart")]
    DuplicateItem(String),

    /// The catalog has no product registered under the sku.
    #[error("No product found for sku {0}")]
    ProductNotFound(String),

    /// The sku is not in the cart.
    #[error("Item {0} is not in the cart")]
    ItemNotFound(String),

    /// The fetched product's currency differs from the cart currency
    /// (sku, product currency, cart currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Wrapped cart item error.
    #[error(transparent)]
    Item(#[from] CartItemError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A sku-keyed shopping cart.
///
/// Holds at most one line per sku, in insertion order. Products and their
/// promotions are fetched from the configured [`Catalog`] when a sku is first
/// added; totals are recomputed from the current lines on every call.
pub struct Cart {
    uuid: Uuid,
    items: Vec<CartItem>,
    currency: &'static Currency,
    catalog: Arc<dyn Catalog>,
}

impl Cart {
    /// Creates a new, empty cart pricing in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            uuid: Uuid::now_v7(),
            items: Vec::new(),
            currency,
            catalog,
        }
    }

    /// The unique identifier of this cart.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The currency all lines in this cart are priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the cart lines in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Check if a sku is in the cart.
    #[must_use]
    pub fn contains(&self, sku: &str) -> bool {
        self.items.iter().any(|item| item.id() == sku)
    }

    /// Get the cart line for a sku.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::ItemNotFound`] if the sku is not in the cart.
    pub fn get_item(&self, sku: &str) -> Result<&CartItem, CartError> {
        self.items
            .iter()
            .find(|item| item.id() == sku)
            .ok_or_else(|| CartError::ItemNotFound(sku.to_string()))
    }

    /// Adds a new line for the sku with the given quantity.
    ///
    /// The product and its promotions are fetched from the catalog
    /// concurrently; both lookups are issued before either is awaited. A
    /// failed add leaves the cart untouched.
    ///
    /// # Errors
    ///
    /// - [`CartError::DuplicateItem`]: the sku is already in the cart.
    /// - [`CartError::ProductNotFound`]: the catalog has no such product.
    /// - [`CartError::CurrencyMismatch`]: the product is priced in another
    ///   currency than the cart.
    /// - [`CartError::Item`]: the quantity is below zero.
    #[tracing::instrument(name = "cart.add", skip(self), fields(cart_uuid = %self.uuid), err)]
    pub async fn add(&mut self, sku: &str, quantity: i64) -> Result<(), CartError> {
        if self.contains(sku) {
            return Err(CartError::DuplicateItem(sku.to_string()));
        }

        let (product, promotions) = tokio::join!(
            self.catalog.fetch_product(sku),
            self.catalog.fetch_promotions(sku),
        );

        let product = product.ok_or_else(|| CartError::ProductNotFound(sku.to_string()))?;
        let product_currency = product.price().currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                sku.to_string(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let item = CartItem::new(product, promotions.unwrap_or_default(), quantity)?;

        self.items.push(item);

        Ok(())
    }

    /// Removes the line for the sku. Unknown skus are ignored.
    pub fn delete(&mut self, sku: &str) {
        self.items.retain(|item| item.id() != sku);
    }

    /// Sets the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::ItemNotFound`] if the sku is not in the cart,
    /// or a [`CartError::Item`] if the quantity is below zero. The line is
    /// left unchanged on failure.
    pub fn update(&mut self, sku: &str, quantity: i64) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == sku)
            .ok_or_else(|| CartError::ItemNotFound(sku.to_string()))?;

        item.set_quantity(quantity)?;

        Ok(())
    }

    /// Scans one unit of a sku: adds a new line at quantity one, or bumps
    /// the quantity of the existing line.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`Cart::add`] error for a sku not yet in the
    /// cart.
    #[tracing::instrument(name = "cart.scan", skip(self), fields(cart_uuid = %self.uuid), err)]
    pub async fn scan(&mut self, sku: &str) -> Result<(), CartError> {
        if let Ok(item) = self.get_item(sku) {
            let next = item.quantity() + 1;

            self.update(sku, next)
        } else {
            self.add(sku, 1).await
        }
    }

    /// Removes one unit of a sku, deleting the line once the quantity would
    /// drop to zero or below. Unknown skus are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Item`] if the decremented quantity is rejected.
    pub fn unscan(&mut self, sku: &str) -> Result<(), CartError> {
        let Ok(item) = self.get_item(sku) else {
            return Ok(());
        };

        let remaining = item.quantity() - 1;

        if remaining > 0 {
            self.update(sku, remaining)
        } else {
            self.delete(sku);

            Ok(())
        }
    }

    /// Calculates the total cost of the cart.
    ///
    /// Each line is priced against snapshots of every other line, so
    /// cross-sku promotion rules see the rest of the cart. The total is
    /// recomputed from the current lines on every call; an empty cart totals
    /// zero in the cart currency.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line price calculation or the money
    /// arithmetic fails.
    pub fn total_cost(&self) -> Result<Money<'static, Currency>, CartError> {
        self.items
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                let cost = item.calculate_price(&self.siblings_of(item.id()))?;

                Ok(acc.add(cost)?)
            })
    }

    /// Builds a line-by-line receipt of the cart in insertion order.
    ///
    /// Line costs are computed exactly as in [`Cart::total_cost`]; the
    /// receipt also carries the undiscounted subtotal for savings reporting.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line price calculation or the money
    /// arithmetic fails.
    pub fn receipt(&self) -> Result<Receipt, CartError> {
        let zero = Money::from_minor(0, self.currency);
        let mut lines = Vec::with_capacity(self.items.len());
        let mut subtotal = zero;
        let mut total = zero;

        for item in &self.items {
            let cost = item.calculate_price(&self.siblings_of(item.id()))?;

            subtotal = subtotal.add(item.full_price())?;
            total = total.add(cost)?;

            lines.push(ReceiptLine::new(
                item.product().clone(),
                item.promotions().to_vec(),
                item.quantity(),
                cost,
            ));
        }

        Ok(Receipt::new(lines, subtotal, total, self.currency))
    }

    /// Snapshots of every line other than the given sku.
    fn siblings_of(&self, sku: &str) -> SmallVec<[ItemSnapshot; 8]> {
        self.items
            .iter()
            .filter(|item| item.id() != sku)
            .map(CartItem::snapshot)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("uuid", &self.uuid)
            .field("items", &self.items)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}
