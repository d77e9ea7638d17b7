//! Position tracking for a single ticker.

use crate::types::{Price, Symbol};

/// A holding in a single instrument, together with its target share of the
/// portfolio.
///
/// Symbol, unit price and target allocation are fixed when the position is
/// loaded. Only the quantity changes, one unit per purchase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Ticker this position is for
    symbol: Symbol,
    /// Unit price (cents)
    price: Price,
    /// Whole units held
    quantity: u64,
    /// Target share of total value, in percent (0, 100]
    target_allocation: f64,
}

impl Position {
    /// Create a position.
    ///
    /// `price` must be strictly positive and `target_allocation` in (0, 100].
    /// Loaders validate both; violating them is a programming error here.
    pub fn new(symbol: Symbol, price: Price, quantity: u64, target_allocation: f64) -> Self {
        debug_assert!(price.is_positive(), "price must be positive, got {price}");
        debug_assert!(
            target_allocation > 0.0 && target_allocation <= 100.0,
            "target allocation must be in (0, 100], got {target_allocation}"
        );
        Self {
            symbol,
            price,
            quantity,
            target_allocation,
        }
    }

    #[inline]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    #[inline]
    pub fn target_allocation(&self) -> f64 {
        self.target_allocation
    }

    /// Current market value (cents), or `None` if it does not fit in an `i64`.
    #[inline]
    pub fn checked_market_value(&self) -> Option<i64> {
        i64::try_from(self.quantity).ok()?.checked_mul(self.price.0)
    }

    /// Current market value (cents), saturating at `i64::MAX`.
    ///
    /// A [`Portfolio`](crate::Portfolio) only accepts positions whose value
    /// fits, so inside one this is exact.
    #[inline]
    pub fn market_value(&self) -> i64 {
        self.checked_market_value().unwrap_or(i64::MAX)
    }

    /// Share of `total_value` held in this position, in percent.
    ///
    /// Returns 0 when `total_value` is not positive.
    pub fn allocation_pct(&self, total_value: i64) -> f64 {
        if total_value > 0 {
            100.0 * self.market_value() as f64 / total_value as f64
        } else {
            0.0
        }
    }

    /// Signed deviation from target, as a percentage of the target.
    ///
    /// Negative means under-allocated, positive means over-allocated.
    pub fn drift_pct(&self, total_value: i64) -> f64 {
        let current = self.allocation_pct(total_value);
        100.0 * (current - self.target_allocation) / self.target_allocation
    }

    /// Add one unit.
    #[inline]
    pub(crate) fn add_unit(&mut self) {
        self.quantity += 1;
    }
}
