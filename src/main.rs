//! Checkout demo over the sample catalog.
//!
//! Scans a handful of well-known baskets, prints their receipts (or a JSON
//! projection with `--json`) and exits non-zero if any total deviates from
//! the expected amount.

use std::{io, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rusty_money::{Money, iso::USD};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use till::{cart::Cart, fixtures::SampleCatalog, receipt::Receipt};

/// The demo baskets and their expected totals in minor units.
const SCENARIOS: [(&str, &[&str], i64); 3] = [
    ("three TVs and an adapter", &["atv", "atv", "atv", "vga"], 24_900),
    (
        "two TVs and five iPads",
        &["atv", "ipd", "ipd", "atv", "ipd", "ipd", "ipd"],
        271_895,
    ),
    (
        "a MacBook, an adapter and an iPad",
        &["mbp", "vga", "ipd"],
        194_998,
    ),
];

/// Checkout demo over the sample catalog.
#[derive(Debug, Parser)]
#[command(version)]
struct DemoArgs {
    /// Run a single scenario by its number (1-based).
    #[arg(long)]
    scenario: Option<usize>,

    /// Emit the runs as JSON instead of rendered receipts.
    #[arg(long)]
    json: bool,
}

/// JSON projection of a demo run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput {
    description: String,
    total_cost: String,
    expected_cost: String,
    matches_expectation: bool,
    lines: Vec<LineOutput>,
}

/// JSON projection of one receipt line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LineOutput {
    product: String,
    quantity: i64,
    promotions: Vec<String>,
    final_cost: String,
}

impl RunOutput {
    fn project(description: &str, expected: i64, receipt: &Receipt) -> Self {
        let lines = receipt
            .lines()
            .iter()
            .map(|line| LineOutput {
                product: line.product().name().to_string(),
                quantity: line.quantity(),
                promotions: line
                    .promotions()
                    .iter()
                    .map(|promotion| promotion.description().to_string())
                    .collect(),
                final_cost: line.cost().to_string(),
            })
            .collect();

        Self {
            description: description.to_string(),
            total_cost: receipt.total().to_string(),
            expected_cost: Money::from_minor(expected, USD).to_string(),
            matches_expectation: receipt.total().to_minor_units() == expected,
            lines,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let args = DemoArgs::parse();
    let mut ran = 0_usize;
    let mut runs = Vec::new();
    let mut failures = Vec::new();

    for (index, &(description, skus, expected)) in SCENARIOS.iter().enumerate() {
        let number = index + 1;

        if args.scenario.is_some_and(|wanted| wanted != number) {
            continue;
        }

        ran += 1;

        let cart = checkout(skus)
            .await
            .with_context(|| format!("scenario {number} ({description})"))?;
        let receipt = cart.receipt()?;

        if args.json {
            runs.push(RunOutput::project(description, expected, &receipt));
        } else {
            print_run(number, description, &receipt)?;
        }

        let total = receipt.total().to_minor_units();

        if total != expected {
            failures.push(format!(
                "scenario {number} ({description}) totalled {total} instead of {expected} minor units"
            ));
        }
    }

    if ran == 0 {
        bail!("unknown scenario; pick 1..={}", SCENARIOS.len());
    }

    if args.json {
        print_json(&runs)?;
    }

    if !failures.is_empty() {
        bail!("{}", failures.join("; "));
    }

    Ok(())
}

/// Scan each sku in order into a fresh cart over the sample catalog.
async fn checkout(skus: &[&str]) -> Result<Cart> {
    let catalog = Arc::new(SampleCatalog::new()?);
    let mut cart = Cart::new(USD, catalog);

    for sku in skus {
        cart.scan(sku).await?;
    }

    Ok(cart)
}

#[expect(clippy::print_stdout, reason = "Demo program output to user")]
fn print_run(number: usize, description: &str, receipt: &Receipt) -> Result<()> {
    println!("Scenario {number}: {description}");
    println!();

    receipt.write_to(io::stdout().lock())?;

    println!();

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Demo program output to user")]
fn print_json(runs: &[RunOutput]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(runs)?);

    Ok(())
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    Ok(())
}
