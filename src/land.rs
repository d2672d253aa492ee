//! Land fertility buckets and the allocation routine shared by planting,
//! land sales and war annexation.
//!
//! Land is tracked as six ordered buckets of hectares at 100%, 80%, 60%,
//! 40% and 20% fertility plus depleted land that produces nothing until it
//! has lain fallow. The sum of the buckets is always the duchy's total land.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Number of fertility tiers, including depleted land.
pub const TIERS: usize = 6;

/// How many of the tiers count as "good" land (100%, 80%, 60%). Only good
/// land can be sold, and annexed land moves through these tiers.
pub const GOOD_TIERS: usize = 3;

/// Distribute `amount` hectares across `buckets`, returning a draw per bucket.
///
/// Greedy mode walks the buckets in order and takes `min(remaining, bucket)`
/// from each, so the best buckets are exhausted first. Proportional mode caps
/// each draw at `round(bucket / buckets_left)`, which spreads a loss across
/// tiers weighted toward whichever tier still holds the largest share; the
/// last bucket absorbs any remainder.
///
/// Asking for more than the buckets hold yields the full contents in greedy
/// mode; the deficit is dropped silently. Asking for zero yields all zeros.
pub fn allocate(buckets: &[i32], mut amount: i32, proportional: bool) -> Vec<i32> {
    debug_assert!(amount >= 0);
    debug_assert!(buckets.iter().all(|&b| b >= 0));

    let n = buckets.len();
    buckets
        .iter()
        .enumerate()
        .map(|(i, &bucket)| {
            let limit = if proportional {
                (f64::from(bucket) / (n - i) as f64).round() as i32
            } else {
                bucket
            };
            let x = amount.min(limit);
            amount = (amount - x).max(0);
            x
        })
        .collect()
}

/// The duchy's land, bucketed by fertility tier, best tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandBuckets(pub [i32; TIERS]);

impl LandBuckets {
    /// Total hectares across all tiers.
    pub fn total(&self) -> i32 {
        self.0.iter().sum()
    }

    /// Hectares of sellable land (the three best tiers).
    pub fn good_land(&self) -> i32 {
        self.0[..GOOD_TIERS].iter().sum()
    }

    /// Bought land arrives as 60% land; whoever sold it farmed it.
    pub fn buy(&mut self, amount: i32) {
        self.0[2] += amount;
    }

    /// Sell land, drawn from the good tiers starting at 60% and working up
    /// to the 100% land, so the best land is parted with last.
    pub fn sell(&mut self, amount: i32) {
        let reversed: Vec<i32> = self.0[..GOOD_TIERS].iter().rev().copied().collect();
        let draws = allocate(&reversed, amount, false);
        for (i, drawn) in draws.iter().rev().enumerate() {
            self.0[i] -= drawn;
        }
    }

    /// Choose which hectares to plant, best tiers first. Returns the per-tier
    /// sown areas without mutating the buckets; pass the result to
    /// [`LandBuckets::rotate`] once the harvest is settled.
    pub fn sow(&self, farmed: i32) -> [i32; TIERS] {
        let mut sown = [0; TIERS];
        sown.copy_from_slice(&allocate(&self.0, farmed, false));
        sown
    }

    /// Fertility-weighted planted area: each productive tier contributes at
    /// its percentage, depleted land contributes nothing.
    pub fn weighted_area(sown: &[i32; TIERS]) -> Decimal {
        sown[..TIERS - 1]
            .iter()
            .enumerate()
            .map(|(i, &area)| Decimal::from(area) * (dec!(1.0) - dec!(0.2) * Decimal::from(i as i32)))
            .sum()
    }

    /// End-of-year crop rotation. Planted land drops one fertility tier
    /// (20% land becomes depleted), while fallow land recovers: fallow good
    /// land pools at 100%, and fallow 40%/20%/depleted land each climb a tier.
    pub fn rotate(&mut self, sown: &[i32; TIERS]) {
        let b = &self.0;
        let fallow: Vec<i32> = b.iter().zip(sown).map(|(a, s)| a - s).collect();
        self.0 = [
            fallow[0] + fallow[1] + fallow[2],
            sown[0] + fallow[3],
            sown[1] + fallow[4],
            sown[2] + fallow[5],
            sown[3],
            sown[4] + sown[5],
        ];
    }

    /// Apply a war's land delta. Gains are split equally across the good
    /// tiers (later tiers absorb the rounding remainder); losses are drawn
    /// proportionally from the good tiers.
    pub fn annex(&mut self, delta: i32) {
        if delta >= 0 {
            let mut remaining = delta;
            for i in 0..GOOD_TIERS {
                let share = (f64::from(remaining) / (GOOD_TIERS - i) as f64).round() as i32;
                self.0[i] += share;
                remaining -= share;
            }
            debug_assert_eq!(remaining, 0);
        } else {
            let mut remaining = -delta;
            let draws = allocate(&self.0[..GOOD_TIERS], remaining, true);
            for (i, drawn) in draws.iter().enumerate() {
                self.0[i] -= drawn;
                remaining -= drawn;
            }
            // The proportional pass comes up short when little good land is
            // left; the rest is taken wherever it stands.
            for bucket in self.0.iter_mut() {
                let x = remaining.min(*bucket);
                *bucket -= x;
                remaining -= x;
            }
            debug_assert_eq!(remaining, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_allocate_exhausts_left_to_right() {
        assert_eq!(allocate(&[1, 0, 0], 1, false), vec![1, 0, 0]);
        assert_eq!(allocate(&[0, 1, 0], 1, false), vec![0, 1, 0]);
        assert_eq!(allocate(&[0, 0, 1], 1, false), vec![0, 0, 1]);
        assert_eq!(allocate(&[1, 0, 0], 2, false), vec![1, 0, 0]);
        assert_eq!(allocate(&[1, 1, 0], 2, false), vec![1, 1, 0]);
        assert_eq!(allocate(&[1, 1, 0], 1, false), vec![1, 0, 0]);
        assert_eq!(allocate(&[2, 0, 0], 1, false), vec![1, 0, 0]);
        assert_eq!(allocate(&[1, 0, 1], 2, false), vec![1, 0, 1]);
        assert_eq!(allocate(&[10, 10, 10], 30, false), vec![10, 10, 10]);
        assert_eq!(allocate(&[10, 10, 9], 30, false), vec![10, 10, 9]);
        assert_eq!(allocate(&[10, 10, 10], 29, false), vec![10, 10, 9]);
    }

    #[test]
    fn allocate_zero_and_empty_buckets() {
        assert_eq!(allocate(&[1, 0, 0], 0, false), vec![0, 0, 0]);
        assert_eq!(allocate(&[0, 0, 0], 1, false), vec![0, 0, 0]);
        assert_eq!(allocate(&[0, 0, 0], 1, true), vec![0, 0, 0]);
    }

    #[test]
    fn proportional_allocate_reference_case() {
        assert_eq!(allocate(&[10, 10, 10], 15, true), vec![3, 5, 7]);
    }

    #[test]
    fn allocate_conserves_and_respects_capacity() {
        let cases: &[(&[i32], i32)] = &[
            (&[216, 200, 184, 0, 0, 0], 768),
            (&[216, 200, 184, 0, 0, 0], 600),
            (&[5, 0, 12, 3], 14),
            (&[7], 100),
        ];
        for &(buckets, amount) in cases {
            let draws = allocate(buckets, amount, false);
            let total: i32 = buckets.iter().sum();
            assert_eq!(draws.iter().sum::<i32>(), amount.min(total));
            for (d, b) in draws.iter().zip(buckets) {
                assert!(d <= b);
            }
        }
    }

    #[test]
    fn sell_comes_from_worst_good_land_first() {
        let mut buckets = LandBuckets([216, 200, 184, 0, 0, 0]);
        buckets.sell(200);
        assert_eq!(buckets.0, [216, 184, 0, 0, 0, 0]);
        assert_eq!(buckets.total(), 400);
    }

    #[test]
    fn rotation_depletes_sown_and_recovers_fallow() {
        let buckets = LandBuckets([216, 200, 184, 0, 0, 0]);
        let sown = buckets.sow(384);
        assert_eq!(sown, [216, 168, 0, 0, 0, 0]);

        let mut rotated = buckets;
        rotated.rotate(&sown);
        // 32 HA of 80% land and all the 60% land lay fallow and pool at 100%.
        assert_eq!(rotated.0, [216, 216, 168, 0, 0, 0]);
        assert_eq!(rotated.total(), 600);
    }

    #[test]
    fn weighted_area_discounts_poorer_tiers() {
        let sown = [100, 100, 0, 0, 50, 0];
        assert_eq!(LandBuckets::weighted_area(&sown), dec!(190.0));
    }

    #[test]
    fn annex_gain_splits_across_good_tiers() {
        let mut buckets = LandBuckets([100, 100, 100, 0, 0, 0]);
        buckets.annex(100);
        assert_eq!(buckets.0, [133, 134, 133, 0, 0, 0]);
        assert_eq!(buckets.total(), 400);
    }

    #[test]
    fn annex_loss_is_proportional() {
        let mut buckets = LandBuckets([10, 10, 10, 0, 0, 0]);
        buckets.annex(-15);
        assert_eq!(buckets.0, [7, 5, 3, 0, 0, 0]);
        assert_eq!(buckets.total(), 15);
    }
}
