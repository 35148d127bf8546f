//! # Pricing Module
//!
//! Price resolution and order line composition. This is the pure half of
//! order creation: it decides what each line costs. Whether the inventory
//! can actually cover the line is decided by the inventory ledger in the
//! database layer, inside the same transaction that persists the order.
//!
//! ## Price Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Which price applies?                            │
//! │                                                                     │
//! │  Walk-in order (no customer)                                        │
//! │       └──► regular catalog price                                    │
//! │                                                                     │
//! │  Customer order                                                     │
//! │       ├── special price exists for (customer, stock)?               │
//! │       │        └──► special price                                   │
//! │       └── otherwise                                                 │
//! │                └──► regular catalog price                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolved unit price is snapshotted onto the order item and never
//! recomputed; later catalog or special-price changes must not alter
//! historical order items.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderLineInput, Stock};
use crate::validation::validate_quantity;
use crate::MAX_ORDER_ITEMS;

// =============================================================================
// Missing-Stock Policy
// =============================================================================

/// What to do with an order line whose stock id no longer exists.
///
/// The original behavior silently dropped such lines, which can turn a fat-
/// fingered order into a quiet zero-total one. Rather than hard-code either
/// behavior, callers choose:
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MissingStockPolicy {
    /// Drop the line and keep going (source-compatible default).
    #[default]
    Skip,
    /// Fail the whole order with [`CoreError::StockNotFound`].
    Strict,
}

// =============================================================================
// Priced Lines
// =============================================================================

/// One order line after price resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub stock_id: String,
    /// Carried along for error messages and logging.
    pub stock_name: String,
    pub quantity: i64,
    /// The resolved unit price (special if present, else regular).
    pub unit_price: Money,
    /// unit_price × quantity.
    pub line_total: Money,
}

/// The result of composing an order's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    /// Sum of all line totals. Zero when every line was skipped.
    pub total: Money,
}

// =============================================================================
// Price Resolution
// =============================================================================

/// Resolves the applicable unit price for a stock item.
///
/// Special price wins when present; otherwise the regular catalog price.
/// Walk-in orders never have specials, so callers pass `None`.
///
/// ## Example
/// ```rust
/// use dukaan_core::money::Money;
/// use dukaan_core::pricing::resolve_unit_price;
///
/// let regular = Money::from_paise(1000);
/// assert_eq!(resolve_unit_price(Some(Money::from_paise(700)), regular).paise(), 700);
/// assert_eq!(resolve_unit_price(None, regular).paise(), 1000);
/// ```
#[inline]
pub fn resolve_unit_price(special: Option<Money>, regular: Money) -> Money {
    special.unwrap_or(regular)
}

/// Composes order lines into priced lines and an order total.
///
/// ## Arguments
/// * `lines` - The submitted (stock, quantity) pairs, in input order
/// * `stocks` - Snapshot of the referenced stock rows, keyed by id
/// * `special_prices` - The customer's special prices keyed by stock id;
///   pass an empty map for walk-in orders
/// * `policy` - What to do when a line's stock id is absent from `stocks`
///
/// ## Returns
/// Priced lines in input order (minus skipped ones) plus the accumulated
/// total. Quantities are validated; availability is NOT checked here - the
/// inventory ledger enforces that inside the order transaction.
///
/// ## Example
/// ```text
/// lines:    [{A, qty 3}, {B, qty 1}]
/// stocks:   {A: Rs 10.00, B: Rs 5.00}
/// specials: {A: Rs 7.00}
///      │
///      ▼
/// priced:   [{A, 3 × Rs 7.00 = Rs 21.00}, {B, 1 × Rs 5.00 = Rs 5.00}]
/// total:    Rs 26.00
/// ```
pub fn price_lines(
    lines: &[OrderLineInput],
    stocks: &HashMap<String, Stock>,
    special_prices: &HashMap<String, Money>,
    policy: MissingStockPolicy,
) -> CoreResult<PricedOrder> {
    if lines.len() > MAX_ORDER_ITEMS {
        return Err(CoreError::TooManyItems {
            max: MAX_ORDER_ITEMS,
        });
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    for line in lines {
        let stock = match stocks.get(&line.stock_id) {
            Some(stock) => stock,
            None => match policy {
                MissingStockPolicy::Skip => continue,
                MissingStockPolicy::Strict => {
                    return Err(CoreError::StockNotFound(line.stock_id.clone()))
                }
            },
        };

        validate_quantity(line.quantity)?;

        let unit_price = resolve_unit_price(
            special_prices.get(&line.stock_id).copied(),
            stock.regular_price(),
        );
        let line_total = unit_price
            .checked_mul_quantity(line.quantity)
            .ok_or(CoreError::AmountOverflow)?;
        total = total
            .checked_add(line_total)
            .ok_or(CoreError::AmountOverflow)?;

        priced.push(PricedLine {
            stock_id: line.stock_id.clone(),
            stock_name: stock.name.clone(),
            quantity: line.quantity,
            unit_price,
            line_total,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock(id: &str, name: &str, price_paise: i64) -> Stock {
        Stock {
            id: id.to_string(),
            business_id: "b1".to_string(),
            name: name.to_string(),
            regular_price_paise: price_paise,
            quantity_available: 100,
            image: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(stock_id: &str, quantity: i64) -> OrderLineInput {
        OrderLineInput {
            stock_id: stock_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_special_price_wins() {
        let regular = Money::from_paise(1000);
        let special = Money::from_paise(700);
        assert_eq!(resolve_unit_price(Some(special), regular), special);
    }

    #[test]
    fn test_falls_back_to_regular_price() {
        let regular = Money::from_paise(1000);
        assert_eq!(resolve_unit_price(None, regular), regular);
    }

    #[test]
    fn test_price_lines_regular() {
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", 1000))]);
        let priced = price_lines(
            &[line("a", 3)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap();

        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].unit_price, Money::from_paise(1000));
        assert_eq!(priced.lines[0].line_total, Money::from_paise(3000));
        assert_eq!(priced.total, Money::from_paise(3000));
    }

    #[test]
    fn test_price_lines_uses_special_price() {
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", 1000))]);
        let specials = HashMap::from([("a".to_string(), Money::from_paise(700))]);
        let priced = price_lines(
            &[line("a", 2)],
            &stocks,
            &specials,
            MissingStockPolicy::Skip,
        )
        .unwrap();

        // Rs 7.00 × 2 = Rs 14.00, not Rs 20.00
        assert_eq!(priced.total, Money::from_paise(1400));
    }

    #[test]
    fn test_missing_stock_skipped_by_default() {
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", 1000))]);
        let priced = price_lines(
            &[line("ghost", 2), line("a", 1)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap();

        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.total, Money::from_paise(1000));
    }

    #[test]
    fn test_missing_stock_strict_fails() {
        let stocks = HashMap::new();
        let err = price_lines(
            &[line("ghost", 2)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Strict,
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::StockNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_all_lines_skipped_totals_zero() {
        let priced = price_lines(
            &[line("ghost1", 2), line("ghost2", 5)],
            &HashMap::new(),
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap();

        assert!(priced.lines.is_empty());
        assert!(priced.total.is_zero());
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", 1000))]);
        let err = price_lines(
            &[line("a", 0)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_overflowing_line_total_is_an_error() {
        // An absurd unit price must surface as an error, never wrap into a
        // wrong total.
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", i64::MAX / 2))]);
        let err = price_lines(
            &[line("a", 3)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_overflowing_total_accumulation_is_an_error() {
        let stocks = HashMap::from([
            ("a".to_string(), stock("a", "Stock A", i64::MAX / 4)),
            ("b".to_string(), stock("b", "Stock B", i64::MAX / 4)),
        ]);
        let err = price_lines(
            &[line("a", 3), line("b", 3)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_duplicate_lines_priced_independently() {
        let stocks = HashMap::from([("a".to_string(), stock("a", "Stock A", 500))]);
        let priced = price_lines(
            &[line("a", 1), line("a", 2)],
            &stocks,
            &HashMap::new(),
            MissingStockPolicy::Skip,
        )
        .unwrap();

        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.total, Money::from_paise(1500));
    }
}
