//! The detailed yearly ledger shown to the player: peasant, land and grain
//! movements, with the fertility bucket table between the land and grain
//! groups. Zero lines are suppressed, as in the 1984 listing.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::land::LandBuckets;

/// One year's accounting. Deaths and expenses are negative, gains positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub peasants_at_start: i32,
    pub starvations: i32,
    pub kings_levy: i32,
    pub war_casualties: i32,
    pub looting_victims: i32,
    pub disease_victims: i32,
    pub natural_deaths: i32,
    pub births: i32,
    pub peasants_at_end: i32,

    pub land_at_start: i32,
    pub bought_sold: i32,
    pub annexed_land: i32,
    pub land_at_end: i32,

    pub grain_at_start: i32,
    pub used_for_food: i32,
    pub land_deals: i32,
    pub seeding: i32,
    pub rat_losses: i32,
    pub mercenary_hire: i32,
    pub captured_grain: i32,
    pub crop_yield: i32,
    pub castle_expense: i32,
    pub grain_at_end: i32,
}

impl GameReport {
    /// The inherited ledger shown before year one, giving the player some
    /// history of how the dukedom was run before them.
    pub fn year_zero() -> Self {
        GameReport {
            peasants_at_start: 96,
            natural_deaths: -4,
            births: 8,
            peasants_at_end: 100,
            land_at_start: 600,
            land_at_end: 600,
            grain_at_start: 5193,
            used_for_food: -1344,
            seeding: -768,
            crop_yield: 1516,
            castle_expense: -120,
            grain_at_end: 4177,
            ..GameReport::default()
        }
    }

    /// Open a fresh ledger for a new year.
    pub fn open(peasants: i32, land: i32, grain: i32) -> Self {
        GameReport {
            peasants_at_start: peasants,
            land_at_start: land,
            grain_at_start: grain,
            ..GameReport::default()
        }
    }

    /// The grouped detail report, with the bucket table after the land group.
    pub fn render(&self, buckets: &LandBuckets) -> String {
        let mut out = String::new();
        let group = |out: &mut String, lines: &[(&str, i32)]| {
            for &(label, x) in lines {
                if x != 0 {
                    let _ = writeln!(out, "  {:<22}{}", label, x);
                }
            }
            out.push('\n');
        };

        group(
            &mut out,
            &[
                ("Peasants at start", self.peasants_at_start),
                ("Starvations", self.starvations),
                ("King's levy", self.kings_levy),
                ("War casualties", self.war_casualties),
                ("Looting victims", self.looting_victims),
                ("Disease victims", self.disease_victims),
                ("Natural deaths", self.natural_deaths),
                ("Births", self.births),
                ("Peasants at end", self.peasants_at_end),
            ],
        );
        group(
            &mut out,
            &[
                ("Land at start", self.land_at_start),
                ("Bought/sold", self.bought_sold),
                ("Annexed land", self.annexed_land),
                ("Land at end of year", self.land_at_end),
            ],
        );

        let _ = writeln!(out, "  100%  80%  60%  40%  20%  Depl");
        let b = &buckets.0;
        let _ = writeln!(
            out,
            "  {:>5}{:>5}{:>5}{:>5}{:>5}{:>5}\n",
            b[0], b[1], b[2], b[3], b[4], b[5]
        );

        group(
            &mut out,
            &[
                ("Grain at start", self.grain_at_start),
                ("Used for food", self.used_for_food),
                ("Land deals", self.land_deals),
                ("Seeding", self.seeding),
                ("Rat losses", self.rat_losses),
                ("Mercenary hire", self.mercenary_hire),
                ("Captured grain", self.captured_grain),
                ("Crop yield", self.crop_yield),
                ("Castle expense", self.castle_expense),
                ("Grain at end of year", self.grain_at_end),
            ],
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_suppresses_zero_lines() {
        let report = GameReport::year_zero();
        let text = report.render(&LandBuckets([216, 200, 184, 0, 0, 0]));
        assert!(text.contains("Peasants at start     96"));
        assert!(text.contains("Natural deaths        -4"));
        assert!(!text.contains("Starvations"));
        assert!(text.contains("100%  80%  60%  40%  20%  Depl"));
        assert!(text.contains("216"));
    }

    #[test]
    fn year_zero_ledger_balances() {
        let report = GameReport::year_zero();
        assert_eq!(
            report.peasants_at_start + report.natural_deaths + report.births,
            report.peasants_at_end
        );
        assert_eq!(
            report.grain_at_start
                + report.used_for_food
                + report.seeding
                + report.crop_yield
                + report.castle_expense,
            report.grain_at_end
        );
    }
}
