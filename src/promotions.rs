//! Promotions

use std::{fmt, sync::Arc};

use rusty_money::{Money, iso::Currency};

use crate::products::Product;

/// A quantity-annotated view of one cart line, as seen by pricing rules.
///
/// Rules receive the line under evaluation plus a snapshot of every other
/// line in the cart; neither carries a reference back to the cart itself.
#[derive(Clone, Debug)]
pub struct ItemSnapshot {
    product: Product,
    quantity: i64,
}

impl ItemSnapshot {
    /// Creates a new snapshot of a cart line.
    #[must_use]
    pub fn new(product: Product, quantity: i64) -> Self {
        Self { product, quantity }
    }

    /// Returns the product of the snapshotted line.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the quantity of the snapshotted line.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The undiscounted price of the line: unit price times quantity.
    #[must_use]
    pub fn full_price(&self) -> Money<'static, Currency> {
        let unit = self.product.price();

        Money::from_minor(unit.to_minor_units() * self.quantity, unit.currency())
    }
}

/// A pricing rule: given the current line and its sibling lines, yields a
/// candidate total price for the current line.
///
/// Rules are self-gating. A rule whose conditions are not met returns the
/// full price of the line, so callers can always take the minimum over every
/// rule attached to an item without a separate applicability check.
pub type PricingRule =
    Arc<dyn Fn(&ItemSnapshot, &[ItemSnapshot]) -> Money<'static, Currency> + Send + Sync>;

/// A promotion: identifying metadata plus the pricing rule that computes a
/// candidate line price.
#[derive(Clone)]
pub struct Promotion {
    id: String,
    sku: String,
    description: String,
    rule: PricingRule,
}

impl Promotion {
    /// Creates a new promotion for the given sku.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        sku: impl Into<String>,
        description: impl Into<String>,
        rule: impl Fn(&ItemSnapshot, &[ItemSnapshot]) -> Money<'static, Currency>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            description: description.into(),
            rule: Arc::new(rule),
        }
    }

    /// Returns the promotion id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the sku this promotion is registered against.
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Returns the human-readable description of the promotion.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluates the pricing rule for the given line and its siblings.
    #[must_use]
    pub fn apply(
        &self,
        item: &ItemSnapshot,
        siblings: &[ItemSnapshot],
    ) -> Money<'static, Currency> {
        (self.rule)(item, siblings)
    }
}

impl fmt::Debug for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promotion")
            .field("id", &self.id)
            .field("sku", &self.sku)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.id, self.sku, self.description)
    }
}
