//! Till
//!
//! Till is a promotion-aware shopping cart pricing engine written in Rust.
//!
//! Products and their promotions live in a [`catalog::Catalog`]; a
//! [`cart::Cart`] fetches them as skus are added or scanned, and prices
//! every line by letting all of its promotion rules bid and keeping the
//! cheapest outcome.

pub mod cart;
pub mod catalog;
pub mod fixtures;
pub mod items;
pub mod products;
pub mod promotions;
pub mod receipt;
