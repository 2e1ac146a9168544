//! Fixed-point price representation.
//!
//! `Decimal` is exact at the API boundary but comparing it directly as a
//! `BTreeMap` key works fine too; we still scale to an integer tick so the
//! `remaining == 0` finality test and level aggregation never depend on
//! `Decimal`'s internal scale normalization.

use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Number of decimal places preserved when a price is scaled to a tick.
const SCALE: u32 = 8;

/// A price scaled to an integer tick, used as the `BTreeMap` key for a side
/// of an order book.
///
/// Bids and asks both use a plain ascending `Tick` ordering; "best" is
/// `next_back()` on the bid map and `next()` on the ask map. There is no
/// negated-key trick anywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick(i128);

impl Tick {
    pub fn from_decimal(price: Decimal) -> Self {
        let scale_factor = Decimal::from(10i64.pow(SCALE));
        let scaled = (price * scale_factor).trunc();
        Tick(scaled.mantissa() / 10i128.pow(scaled.scale()))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(self.0, SCALE)
    }
}

impl Ord for Tick {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_trips_through_tick() {
        let price = dec!(97500.50);
        assert_eq!(Tick::from_decimal(price).to_decimal(), price);
    }

    #[test]
    fn orders_numerically() {
        let low = Tick::from_decimal(dec!(100.0));
        let high = Tick::from_decimal(dec!(200.0));
        assert!(low < high);
    }
}
