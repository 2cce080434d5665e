//! Rounding and guarded-division helpers shared by the aggregates.

use std::ops::Add;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to two decimal places, halves away from zero.
///
/// Rounding happens on the shortest decimal form of `value`, so `1.005` becomes `1.01` even though
/// the nearest double sits just below the midpoint. Values outside the decimal range fall back to
/// binary rounding.
pub fn round2(value: f64) -> f64 {
    Decimal::from_str(&value.to_string())
        .ok()
        .and_then(|decimal| {
            decimal
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or_else(|| (value * 100.0).round() / 100.0)
}

/// `numerator / denominator * 100` rounded to two places, or `0.0` when the denominator is zero.
/// The zero check happens before any division or rounding.
pub fn percent_or_zero(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64 * 100.0)
    } else {
        0.0
    }
}

/// `numerator / denominator` rounded to two places, or `0.0` when the denominator is zero.
pub fn ratio_or_zero(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64)
    } else {
        0.0
    }
}

/// SQL-style sum: null inputs are skipped and an all-null input sums to null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullableSum<T> {
    total: Option<T>,
}

impl<T> Default for NullableSum<T> {
    fn default() -> Self {
        Self { total: None }
    }
}

impl<T: Copy + Add<Output = T>> NullableSum<T> {
    pub fn add(&mut self, value: Option<T>) {
        if let Some(value) = value {
            self.total = Some(match self.total {
                Some(total) => total + value,
                None => value,
            });
        }
    }

    pub fn value(&self) -> Option<T> {
        self.total
    }
}
