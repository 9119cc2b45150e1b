//! Receipts

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{products::Product, promotions::Promotion};

/// Errors related to rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Wrapped output error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A single printed line of a receipt.
#[derive(Clone, Debug)]
pub struct ReceiptLine {
    product: Product,
    promotions: Vec<Promotion>,
    quantity: i64,
    cost: Money<'static, Currency>,
}

impl ReceiptLine {
    /// Create a new receipt line.
    #[must_use]
    pub fn new(
        product: Product,
        promotions: Vec<Promotion>,
        quantity: i64,
        cost: Money<'static, Currency>,
    ) -> Self {
        Self {
            product,
            promotions,
            quantity,
            cost,
        }
    }

    /// The product purchased on this line.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// The promotions that were considered for this line.
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// The number of units purchased.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The amount actually paid for the line.
    #[must_use]
    pub fn cost(&self) -> Money<'static, Currency> {
        self.cost
    }

    /// The undiscounted price for the line.
    #[must_use]
    pub fn full_price(&self) -> Money<'static, Currency> {
        let unit = self.product.price();

        Money::from_minor(unit.to_minor_units() * self.quantity, unit.currency())
    }

    /// The amount saved on this line by the winning promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'static, Currency>, MoneyError> {
        self.full_price().sub(self.cost)
    }
}

/// Priced summary of a cart at a point in time.
#[derive(Clone, Debug)]
pub struct Receipt {
    lines: Vec<ReceiptLine>,
    subtotal: Money<'static, Currency>,
    total: Money<'static, Currency>,
    currency: &'static Currency,
}

impl Receipt {
    /// Create a new receipt with the given details.
    #[must_use]
    pub fn new(
        lines: Vec<ReceiptLine>,
        subtotal: Money<'static, Currency>,
        total: Money<'static, Currency>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines,
            subtotal,
            total,
            currency,
        }
    }

    /// The receipt lines, in the order the items entered the cart.
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Total cost before any promotion applications.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Total amount paid for all items after any promotion applications.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the savings made by applying promotions.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'static, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// The fraction of the subtotal saved by promotions.
    ///
    /// A receipt with a zero subtotal reports zero savings.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the savings calculation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let saved = self.savings()?.to_minor_units();
        let subtotal = self.subtotal.to_minor_units();

        if subtotal == 0 {
            return Ok(Percentage::from(0.0));
        }

        // The ratio is taken in decimal space to avoid integer truncation.
        let saved = Decimal::from_i64(saved).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_i64(subtotal).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(saved / subtotal))
    }

    /// Render the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line savings calculation or a write
    /// to the output fails.
    pub fn write_to(&self, mut writer: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "", "Item", "Qty", "Unit Price", "Line Total", "Savings", "Promotion",
        ]);

        for (index, line) in self.lines.iter().enumerate() {
            let promotions = line
                .promotions()
                .iter()
                .map(Promotion::description)
                .collect::<Vec<_>>()
                .join(", ");

            builder.push_record([
                format!("#{:<3}", index + 1),
                line.product().name().to_string(),
                line.quantity().to_string(),
                line.product().price().to_string(),
                line.cost().to_string(),
                line.savings()?.to_string(),
                promotions,
            ]);
        }

        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        let mut table = builder.build();

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..6), Alignment::right());

        writeln!(writer, "{table}")?;
        writeln!(writer)?;
        writeln!(writer, "Subtotal: {}", self.subtotal)?;
        writeln!(writer, "Total:    {}", self.total)?;

        let percent = (self.savings_percent()? * Decimal::ONE_HUNDRED).round_dp(2);

        writeln!(writer, "Saved:    {} ({percent}%)", self.savings()?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn laptop_line() -> TestResult<ReceiptLine> {
        let product = Product::new("mbp", "MacBook Pro", Money::from_minor(139_999, iso::USD))?;
        let promotion = Promotion::new("mbp-bundle", "mbp", "Bundled VGA adapter", |item, _| {
            item.full_price()
        });

        Ok(ReceiptLine::new(
            product,
            vec![promotion],
            2,
            Money::from_minor(259_998, iso::USD),
        ))
    }

    #[test]
    fn line_savings_is_full_price_minus_cost() -> TestResult {
        let line = laptop_line()?;

        assert_eq!(line.full_price(), Money::from_minor(279_998, iso::USD));
        assert_eq!(line.savings()?, Money::from_minor(20_000, iso::USD));

        Ok(())
    }

    #[test]
    fn accessors_return_values_from_constructor() {
        let receipt = Receipt::new(
            Vec::new(),
            Money::from_minor(300, iso::GBP),
            Money::from_minor(250, iso::GBP),
            iso::GBP,
        );

        assert_eq!(receipt.subtotal(), Money::from_minor(300, iso::GBP));
        assert_eq!(receipt.total(), Money::from_minor(250, iso::GBP));
        assert_eq!(receipt.currency(), iso::GBP);
        assert!(receipt.lines().is_empty());
    }

    #[test]
    fn savings_is_subtotal_minus_total() -> TestResult {
        let receipt = Receipt::new(
            Vec::new(),
            Money::from_minor(300, iso::GBP),
            Money::from_minor(250, iso::GBP),
            iso::GBP,
        );

        assert_eq!(receipt.savings()?, Money::from_minor(50, iso::GBP));

        Ok(())
    }

    #[test]
    fn savings_errors_on_currency_mismatch() {
        let receipt = Receipt::new(
            Vec::new(),
            Money::from_minor(300, iso::GBP),
            Money::from_minor(250, iso::USD),
            iso::GBP,
        );

        assert_eq!(
            receipt.savings(),
            Err(MoneyError::CurrencyMismatch {
                expected: iso::GBP.iso_alpha_code,
                actual: iso::USD.iso_alpha_code,
            })
        );
    }

    #[test]
    fn savings_percent_is_a_fraction_of_the_subtotal() -> TestResult {
        let receipt = Receipt::new(
            Vec::new(),
            Money::from_minor(300, iso::GBP),
            Money::from_minor(250, iso::GBP),
            iso::GBP,
        );

        let percent = (receipt.savings_percent()? * Decimal::ONE_HUNDRED).round_dp(2);

        assert_eq!(percent, Decimal::new(16_67, 2));

        Ok(())
    }

    #[test]
    fn savings_percent_of_an_empty_receipt_is_zero() -> TestResult {
        let receipt = Receipt::new(
            Vec::new(),
            Money::from_minor(0, iso::USD),
            Money::from_minor(0, iso::USD),
            iso::USD,
        );

        assert_eq!(receipt.savings_percent()?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let receipt = Receipt::new(
            vec![laptop_line()?],
            Money::from_minor(279_998, iso::USD),
            Money::from_minor(259_998, iso::USD),
            iso::USD,
        );

        let mut rendered = Vec::new();

        receipt.write_to(&mut rendered)?;

        let rendered = String::from_utf8(rendered)?;

        assert!(rendered.contains("MacBook Pro"), "missing product name");
        assert!(rendered.contains("Bundled VGA adapter"), "missing promotion");
        assert!(rendered.contains("Subtotal: $2,799.98"), "missing subtotal");
        assert!(rendered.contains("Total:    $2,599.98"), "missing total");
        assert!(rendered.contains("$200.00"), "missing savings");

        Ok(())
    }
}
