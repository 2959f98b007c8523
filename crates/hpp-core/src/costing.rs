//! # Costing Engine
//!
//! Derives production cost (HPP), selling price and gross profit from a
//! bill of materials and two percentages.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BoM lines ──Σ price×qty──► total material cost                         │
//! │                                   │                                     │
//! │                                   ▼  ÷ (1 - overhead/100)               │
//! │                             production cost (HPP)                       │
//! │                                   │                                     │
//! │                                   ▼  ÷ (1 - margin/100)                 │
//! │                             selling price                               │
//! │                                   │                                     │
//! │                                   ▼  selling - production               │
//! │                             gross profit per unit                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Gross-up, not markup
//! Both percentages are shares of the *result*, not of the input: a 30%
//! margin means profit is 30% of the selling price. A percentage of 100 or
//! more would divide by zero or flip the sign, so the step passes its input
//! through unchanged instead.
//!
//! Every function here is pure and infallible. Only [`compute_all`] rounds,
//! and only its four outputs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Priced Line
// =============================================================================

/// Anything that contributes `price * quantity` to a material total.
pub trait PricedLine {
    fn price(&self) -> f64;
    fn quantity(&self) -> f64;
}

impl<T: PricedLine + ?Sized> PricedLine for &T {
    fn price(&self) -> f64 {
        (**self).price()
    }

    fn quantity(&self) -> f64 {
        (**self).quantity()
    }
}

// =============================================================================
// Steps
// =============================================================================

/// `price * quantity`. No clamping.
#[inline]
pub fn subtotal(price: f64, quantity: f64) -> f64 {
    price * quantity
}

/// Sum of line subtotals; an empty BoM costs 0.
pub fn total_material_cost<L: PricedLine>(lines: &[L]) -> f64 {
    lines
        .iter()
        .map(|line| subtotal(line.price(), line.quantity()))
        .sum()
}

/// Grosses `amount` up so that `percentage` is that share of the result.
fn gross_up(amount: f64, percentage: f64) -> f64 {
    if percentage >= 100.0 {
        return amount;
    }
    amount / (1.0 - percentage / 100.0)
}

/// Production cost (HPP) from material cost and overhead percentage.
///
/// ```rust
/// use hpp_core::costing::production_cost;
///
/// assert_eq!(production_cost(25_000.0, 20.0), 31_250.0);
/// assert_eq!(production_cost(25_000.0, 100.0), 25_000.0);
/// ```
pub fn production_cost(total_material_cost: f64, overhead_percentage: f64) -> f64 {
    gross_up(total_material_cost, overhead_percentage)
}

/// Selling price from production cost and target margin percentage.
pub fn selling_price(production_cost: f64, target_margin_percentage: f64) -> f64 {
    gross_up(production_cost, target_margin_percentage)
}

/// Selling price minus production cost.
#[inline]
pub fn gross_profit(selling_price: f64, production_cost: f64) -> f64 {
    selling_price - production_cost
}

// =============================================================================
// Aggregate
// =============================================================================

/// The four derived figures of a product, in whole Rupiah.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub total_material_cost: Money,
    pub production_cost: Money,
    pub estimated_selling_price: Money,
    pub gross_profit_per_unit: Money,
}

/// Runs the whole pipeline and rounds each output to the nearest Rupiah.
///
/// Intermediates stay unrounded: the selling price is grossed up from the
/// exact production cost, not from its rounded display value.
pub fn compute_all<L: PricedLine>(
    lines: &[L],
    overhead_percentage: f64,
    target_margin_percentage: f64,
) -> CostBreakdown {
    let material = total_material_cost(lines);
    let production = production_cost(material, overhead_percentage);
    let selling = selling_price(production, target_margin_percentage);
    let profit = gross_profit(selling, production);

    CostBreakdown {
        total_material_cost: Money::round_half_up(material),
        production_cost: Money::round_half_up(production),
        estimated_selling_price: Money::round_half_up(selling),
        gross_profit_per_unit: Money::round_half_up(profit),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
