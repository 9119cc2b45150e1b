//! Catalog lookup

use async_trait::async_trait;
use mockall::automock;

use crate::{products::Product, promotions::Promotion};

/// Read-only, sku-keyed access to products and their promotions.
///
/// Lookups are infallible: an unknown sku is a domain answer (`None`), not an
/// error. Implementations must be idempotent and free of side effects
/// observable by the cart.
#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Retrieve the product registered under the given sku.
    async fn fetch_product(&self, sku: &str) -> Option<Product>;

    /// Retrieve the promotions registered against the given sku.
    async fn fetch_promotions(&self, sku: &str) -> Option<Vec<Promotion>>;
}
