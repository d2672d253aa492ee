//! The yearly step of the dukedom: feeding, the land market, planting,
//! hazards, war and demographics, in the order of the original game.
//!
//! All world state lives in [`GameState`] and is threaded through
//! [`step`] once per year; the war resolver and land allocator are pure
//! value computations whose deltas are applied here. Decisions come from a
//! [`Steward`](crate::strategies::Steward) through an explicit
//! request/validate/apply exchange: a proposed decision is checked against
//! the state and either applied or bounced back with a [`Rejection`].

use std::fmt;

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::curves::{Curve, CurveSampler};
use crate::events::{EventLogger, EventType};
use crate::land::LandBuckets;
use crate::report::GameReport;
use crate::strategies::{LandDeal, LevyAnswer, Steward};
use crate::war::War;

/// Hectolitres of grain a peasant must eat in a year to not starve.
pub const RATION: i32 = 13;
/// Hectolitres of seed grain per hectare planted.
pub const SEED_PER_HECTARE: i32 = 2;
/// One peasant can plant at most this many hectares.
pub const HECTARES_PER_PEASANT: i32 = 4;
/// Mercenaries available for hire in any one year.
pub const MAX_MERCENARIES: i32 = 75;
/// No one has more grain than this to pay for land in a single year.
pub const SALE_CAP: i32 = 4000;
/// The duke retires after this many years on the throne.
pub const RETIREMENT_YEAR: i32 = 45;

const PLAGUE_COOL_DOWN: i32 = 13;

fn round(x: f64) -> i32 {
    x.round() as i32
}

fn dec_round(d: Decimal) -> i32 {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}

/// Why a proposed decision was refused. The embedded amounts tell the
/// steward what it can still work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Negative,
    NotEnoughGrain { have: i32 },
    NotEnoughGrainToPlant { have: i32 },
    NotEnoughLand { have: i32 },
    NotEnoughGoodLand { have: i32 },
    NotEnoughWorkers { can_farm: i32 },
    NoBuyers,
    TooFewAvailable { available: i32 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Negative => write!(f, "Negative amounts make no sense here."),
            Rejection::NotEnoughGrain { have } => write!(
                f,
                "But you don't have enough grain.\nYou only have {} HL. of grain left.",
                have
            ),
            Rejection::NotEnoughGrainToPlant { have } => write!(
                f,
                "But you don't have enough grain.\nYou only have {} HL. of grain left.\nEnough to plant {} HA. of land",
                have,
                have / SEED_PER_HECTARE
            ),
            Rejection::NotEnoughLand { have } => write!(
                f,
                "But you don't have enough land.\nYou only have {} HA. of land left.",
                have
            ),
            Rejection::NotEnoughGoodLand { have } => {
                write!(f, "But you only have {} HA. of good land.", have)
            }
            Rejection::NotEnoughWorkers { can_farm } => write!(
                f,
                "But you don't have enough peasants to farm that land.\nYou only have enough to farm {} HA. of land.",
                can_farm
            ),
            Rejection::NoBuyers => write!(f, "No buyers have that much grain, try less"),
            Rejection::TooFewAvailable { available } => {
                write!(f, "There are only {} available for hire.", available)
            }
        }
    }
}

/// How a reign comes to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfReign {
    PopulationLoss,
    LandLoss,
    Deposed,
    Retirement,
    Overrun,
}

impl fmt::Display for EndOfReign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            EndOfReign::PopulationLoss => {
                "You have so few peasants left that\n\
                 the High King has abolished your Ducal\n\
                 right.\n"
            }
            EndOfReign::LandLoss => {
                "You have so little land left that\n\
                 the peasants are tired of war and starvation.\n\
                 You are deposed.\n"
            }
            EndOfReign::Deposed => {
                "The peasants are tired of war and starvation.\n\
                 You are deposed.\n"
            }
            EndOfReign::Retirement => "You have reached the age of retirement.\n",
            EndOfReign::Overrun => {
                "You have been overrun and have lost\n\
                 your entire Dukedom. Your head is placed\n\
                 atop of the castle gate.\n"
            }
        };
        f.write_str(msg)
    }
}

impl std::error::Error for EndOfReign {}

/// All persistent world state, owned by the caller and mutated only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub year: i32,
    pub peasants: i32,
    /// Hectolitres of grain in the granary.
    pub grain: i32,
    /// Total hectares; always the sum of `buckets`.
    pub land: i32,
    pub buckets: LandBuckets,
    /// Last harvest's effective yield in HL/HA, kept to two decimals.
    pub crop_yield: Decimal,
    /// Years of plague immunity left.
    pub cool_down: i32,
    /// Long-term resentment trend, decaying 15% a year.
    pub resentment: i32,
    /// Resentment stirred up in the most recent year.
    pub unrest: i32,
}

impl Default for GameState {
    /// The standard 1984 start.
    fn default() -> Self {
        GameState {
            year: 0,
            peasants: 100,
            grain: 4177,
            land: 600,
            buckets: LandBuckets([216, 200, 184, 0, 0, 0]),
            crop_yield: dec!(3.95),
            cool_down: 0,
            resentment: 0,
            unrest: 0,
        }
    }
}

impl GameState {
    /// Check whether the reign is already over. Consulted at the top of each
    /// year, against the state the previous year left behind.
    pub fn end_of_reign(&self) -> Option<EndOfReign> {
        if self.peasants < 33 {
            Some(EndOfReign::PopulationLoss)
        } else if self.land < 200 {
            Some(EndOfReign::LandLoss)
        } else if self.unrest > 88 || self.resentment > 99 || self.grain < 429 {
            Some(EndOfReign::Deposed)
        } else if self.year > RETIREMENT_YEAR {
            Some(EndOfReign::Retirement)
        } else {
            None
        }
    }

    /// How badly the neighbouring duchies are driven to attack: famine
    /// abroad follows a poor yield at home. Never below 2.
    pub fn desperation(&self) -> i32 {
        dec_round(dec!(11) - dec!(1.5) * self.crop_yield).max(2)
    }

    /// Validate a grain-for-food entry. Entries up to 100 are per-head
    /// rations; larger entries are the total amount set aside.
    pub fn check_food(&self, x: i32) -> Result<(), Rejection> {
        if x < 0 {
            Err(Rejection::Negative)
        } else if x > 100 && x > self.grain {
            Err(Rejection::NotEnoughGrain { have: self.grain })
        } else if x <= 100 && x * self.peasants > self.grain {
            Err(Rejection::NotEnoughGrain { have: self.grain })
        } else {
            Ok(())
        }
    }

    pub fn check_buy(&self, x: i32, bid: i32) -> Result<(), Rejection> {
        if x < 0 {
            Err(Rejection::Negative)
        } else if x * bid > self.grain {
            Err(Rejection::NotEnoughGrain { have: self.grain })
        } else {
            Ok(())
        }
    }

    pub fn check_sell(&self, x: i32, offer: i32) -> Result<(), Rejection> {
        if x < 0 {
            Err(Rejection::Negative)
        } else if x > 0 && offer < 1 {
            // bid floors at 1, so the offer can reach 0
            Err(Rejection::NoBuyers)
        } else if x > self.buckets.good_land() {
            Err(Rejection::NotEnoughGoodLand {
                have: self.buckets.good_land(),
            })
        } else if x * offer > SALE_CAP {
            Err(Rejection::NoBuyers)
        } else {
            Ok(())
        }
    }

    pub fn check_farm(&self, x: i32) -> Result<(), Rejection> {
        if x < 0 {
            Err(Rejection::Negative)
        } else if x > self.land {
            Err(Rejection::NotEnoughLand { have: self.land })
        } else if x * SEED_PER_HECTARE > self.grain {
            Err(Rejection::NotEnoughGrainToPlant { have: self.grain })
        } else if x > self.peasants * HECTARES_PER_PEASANT {
            Err(Rejection::NotEnoughWorkers {
                can_farm: self.peasants * HECTARES_PER_PEASANT,
            })
        } else {
            Ok(())
        }
    }

    pub fn check_mercenaries(&self, x: i32) -> Result<(), Rejection> {
        if x < 0 {
            Err(Rejection::Negative)
        } else if x > MAX_MERCENARIES {
            Err(Rejection::TooFewAvailable {
                available: MAX_MERCENARIES,
            })
        } else {
            Ok(())
        }
    }
}

/// Ask the steward until it proposes something the state accepts. A steward
/// that keeps proposing invalid decisions keeps getting asked; interactive
/// stewards re-prompt the player, programmatic ones are expected to clamp.
fn negotiate<T>(
    steward: &mut dyn Steward,
    mut propose: impl FnMut(&mut dyn Steward) -> T,
    check: impl Fn(&T) -> Result<(), Rejection>,
) -> T {
    loop {
        let proposal = propose(&mut *steward);
        match check(&proposal) {
            Ok(()) => return proposal,
            Err(rejection) => {
                debug!("decision rejected: {:?}", rejection);
                steward.rejected(&rejection);
            }
        }
    }
}

/// Advance the world by one year. Returns the year's ledger, or the reason
/// the reign ended.
pub fn step(
    state: &mut GameState,
    sampler: &mut dyn CurveSampler,
    steward: &mut dyn Steward,
    events: &mut EventLogger,
) -> Result<GameReport, EndOfReign> {
    if let Some(end) = state.end_of_reign() {
        return Err(end);
    }

    state.year += 1;
    let year = state.year;
    let mut unrest = 0;
    let mut report = GameReport::open(state.peasants, state.land, state.grain);

    // Feed the peasants.
    let entry = negotiate(steward, |s| s.grain_for_food(state), |&x| state.check_food(x));
    let (food, per_capita) = if entry > 100 {
        (entry, entry / state.peasants)
    } else {
        (entry * state.peasants, entry)
    };
    state.grain -= food;
    report.used_for_food = -food;

    let mut starved = 0;
    if per_capita < RATION {
        starved = state.peasants - food / RATION;
        state.peasants -= starved;
        report.starvations = -starved;
        events.log(year, EventType::Starvation { starved });
    }
    // Short rations anger the peasants three heads per starvation; a little
    // extra (up to four HL a head) soothes them.
    let overfed = (per_capita - 14).min(4);
    unrest += 3 * starved - 2 * overfed;

    if unrest > 88 {
        return Err(EndOfReign::Deposed);
    }
    if state.peasants < 33 {
        return Err(EndOfReign::PopulationLoss);
    }

    // Buy and sell land.
    let swing = sampler.sample(Curve::LandPrice);
    let bid = dec_round(dec!(2) * state.crop_yield + Decimal::from(swing - 5)).max(1);
    let offer = bid - 1;
    let deal = negotiate(
        steward,
        |s| s.land_deal(state, bid, offer),
        |d| match *d {
            LandDeal::Buy(x) => state.check_buy(x, bid),
            LandDeal::Sell(x) => state.check_sell(x, offer),
            LandDeal::Hold => Ok(()),
        },
    );
    match deal {
        LandDeal::Buy(0) | LandDeal::Sell(0) | LandDeal::Hold => {}
        LandDeal::Buy(bought) => {
            state.land += bought;
            state.buckets.buy(bought);
            state.grain -= bid * bought;
            report.bought_sold = bought;
            report.land_deals = -bid * bought;
        }
        LandDeal::Sell(sold) => {
            state.land -= sold;
            state.buckets.sell(sold);
            state.grain += offer * sold;
            report.bought_sold = -sold;
            report.land_deals = offer * sold;
        }
    }

    // Plant.
    let farmed = negotiate(steward, |s| s.land_to_plant(state), |&x| state.check_farm(x));
    let seeding = farmed * SEED_PER_HECTARE;
    state.grain -= seeding;
    report.seeding = -seeding;

    // Crop gains.
    let mut yld = sampler.sample(Curve::Harvest) + 9;
    if year % 7 == 0 {
        let before = yld;
        yld = round(f64::from(yld) * 0.65);
        events.log(
            year,
            EventType::SevenYearLocusts {
                yield_before: before,
                yield_after: yld,
            },
        );
    }
    let sown = state.buckets.sow(farmed);
    state.crop_yield = if farmed > 0 {
        (Decimal::from(yld) * LandBuckets::weighted_area(&sown) / Decimal::from(farmed))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    state.buckets.rotate(&sown);

    // Crop hazards: rats, and sometimes the King's levy on top.
    let hazard = sampler.sample(Curve::CropHazards) + 3;
    if hazard > 9 {
        let eaten = round(f64::from(hazard * state.grain) / 83.0);
        state.grain -= eaten;
        report.rat_losses = -eaten;
        events.log(year, EventType::RatsInGranary { eaten });

        if state.peasants > 66 {
            let levied = sampler.sample(Curve::KingsLevy);
            if levied > 0 && f64::from(levied) < f64::from(state.peasants) / 30.0 {
                let grain_instead = levied * 100;
                match steward.answer_levy(state, levied, grain_instead) {
                    LevyAnswer::SupplyPeasants => {
                        state.peasants -= levied;
                        report.kings_levy = -levied;
                        events.log(
                            year,
                            EventType::KingsLevy {
                                demanded: levied,
                                supplied_peasants: true,
                                grain_paid: 0,
                            },
                        );
                    }
                    LevyAnswer::PayGrain => {
                        state.grain -= grain_instead;
                        report.castle_expense = -grain_instead;
                        events.log(
                            year,
                            EventType::KingsLevy {
                                demanded: levied,
                                supplied_peasants: false,
                                grain_paid: grain_instead,
                            },
                        );
                    }
                }
            }
        }
    }

    let mut harvest = dec_round(state.crop_yield * Decimal::from(farmed));

    // War.
    let desperation = state.desperation();
    if sampler.sample(Curve::WarRisk) < desperation {
        let mercenaries = negotiate(
            steward,
            |s| s.hire_mercenaries(state, crate::war::MERCENARY_RATE),
            |&x| state.check_mercenaries(x),
        );
        events.log(
            year,
            EventType::WarThreatened {
                desperation,
                mercenaries_hired: mercenaries,
            },
        );

        let enemy = sampler.sample(Curve::EnemyStrength);
        let mut war = War::new(enemy, state.peasants, unrest, mercenaries);

        // In a truly desperate year the duke gets one raid in before the
        // armies meet.
        if desperation > 5 {
            war.first_strike(desperation, sampler.sample(Curve::EnemyStrength));
            events.log(
                year,
                EventType::FirstStrike {
                    ceasefire: war.ceasefire,
                    casualties: war.casualties,
                },
            );
        }

        let won = war.campaign(mercenaries, state.grain);

        if war.ceasefire {
            // No land changes hands; only the skirmish losses count.
        } else if won {
            let annexed_crop = if war.landslide {
                // The annexed duchy's fields, already sown, come with it.
                round(f64::from(war.annexed) * 0.55)
            } else {
                // Other duchies farm the optimal two-thirds of their land.
                dec_round(Decimal::from(war.annexed) * dec!(0.67) * state.crop_yield)
            };
            harvest += annexed_crop;
            state.buckets.annex(war.annexed);
            state.grain += war.captured_grain;
            report.captured_grain = war.captured_grain;
            events.log(
                year,
                EventType::WarWon {
                    annexed: war.annexed,
                    captured_grain: war.captured_grain,
                    casualties: war.casualties,
                    landslide: war.landslide,
                },
            );
        } else {
            if war.annexed < -round(f64::from(state.land) * 0.67) {
                return Err(EndOfReign::Overrun);
            }
            state.buckets.annex(war.annexed);
            if state.land > 0 {
                // The ceded land takes its share of the standing crop.
                harvest += dec_round(
                    Decimal::from(war.annexed) * Decimal::from(farmed)
                        / Decimal::from(state.land)
                        * state.crop_yield,
                );
            }
            events.log(
                year,
                EventType::WarLost {
                    annexed: war.annexed,
                    casualties: war.casualties,
                },
            );
        }

        state.peasants -= war.casualties + war.looting_victims;
        state.land += war.annexed;
        state.grain -= war.mercenary_pay;
        unrest += war.resentment;
        report.war_casualties = -war.casualties;
        report.looting_victims = -war.looting_victims;
        report.annexed_land = war.annexed;
        report.mercenary_hire = -war.mercenary_pay;
    }

    // Demographics.
    let outbreak = sampler.sample(Curve::Lifecycle) + 1;
    state.cool_down = (state.cool_down - 1).max(0);
    let mut deaths = 0;
    if outbreak == 1 && state.cool_down == 0 {
        state.cool_down = PLAGUE_COOL_DOWN;
        deaths = -round(f64::from(state.peasants) / 3.0);
        events.log(year, EventType::BlackPlague { deaths });
    } else if (1..4).contains(&outbreak) {
        deaths = -round(f64::from(state.peasants) / f64::from(outbreak * 5));
        events.log(year, EventType::PoxEpidemic { deaths });
    }
    state.peasants += deaths;
    report.disease_victims = deaths;

    let natural = round(0.3 - f64::from(state.peasants) / 22.0);
    report.natural_deaths = natural;
    let births = round(f64::from(state.peasants) / f64::from(sampler.sample(Curve::Lifecycle) + 4));
    report.births = births;
    state.peasants += births + natural;

    // Settle the year.
    state.grain += harvest;
    report.crop_yield = harvest;
    state.resentment = round(f64::from(state.resentment) * 0.85) + unrest;
    state.unrest = unrest;

    report.peasants_at_end = state.peasants;
    report.land_at_end = state.land;
    report.grain_at_end = state.grain;
    events.log(
        year,
        EventType::YearSummary {
            peasants: state.peasants,
            land: state.land,
            grain: state.grain,
            crop_yield: state.crop_yield.to_string(),
        },
    );

    Ok(report)
}
