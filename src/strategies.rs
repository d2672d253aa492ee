//! Stewards: the decision-makers of a reign.
//!
//! Each year the game asks its steward a fixed series of questions: how much
//! grain to set aside for food, whether to deal in land, how much to plant,
//! whether to hire mercenaries, how to answer the King's levy. A steward may
//! be the player at a terminal or a programmatic policy.
//!
//! # Steward types
//!
//! - **Interactive**: prompts the player on stdin, in the tone of the
//!   original game
//! - **Caretaker**: feeds well, plants conservatively, sells land only to
//!   stave off deposition
//! - **Expansionist**: feeds the bare ration and pushes grain into land,
//!   planting and mercenaries

use std::io::{self, BufRead, Write};

use log::info;

use crate::game::{
    GameState, HECTARES_PER_PEASANT, MAX_MERCENARIES, RATION, Rejection, SALE_CAP,
    SEED_PER_HECTARE,
};

/// The land-market decision for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandDeal {
    Buy(i32),
    Sell(i32),
    Hold,
}

/// How to satisfy the King's levy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevyAnswer {
    SupplyPeasants,
    PayGrain,
}

/// A reign's decision-maker.
///
/// Proposals are validated by the game; an invalid one is bounced back
/// through [`rejected`](Steward::rejected) and the question is asked again.
pub trait Steward {
    fn name(&self) -> &str;

    /// Grain to set aside for food. Values up to 100 are a per-head ration,
    /// larger values are the total amount.
    fn grain_for_food(&mut self, state: &GameState) -> i32;

    /// Buy at `bid` or sell at `offer` HL/HA, or sit out the market.
    fn land_deal(&mut self, state: &GameState, bid: i32, offer: i32) -> LandDeal;

    /// Hectares to plant this year.
    fn land_to_plant(&mut self, state: &GameState) -> i32;

    /// Mercenaries to hire at `rate` HL each when war threatens.
    fn hire_mercenaries(&mut self, state: &GameState, rate: i32) -> i32;

    /// The King demands `levied` peasants, or `grain_instead` HL of grain.
    fn answer_levy(&mut self, state: &GameState, levied: i32, grain_instead: i32) -> LevyAnswer;

    /// Called when the previous proposal was refused.
    fn rejected(&mut self, _rejection: &Rejection) {}
}

/// Build a steward by name.
pub fn create_steward(name: &str) -> Option<Box<dyn Steward>> {
    match name {
        "interactive" => Some(Box::new(InteractiveSteward)),
        "caretaker" => Some(Box::new(CaretakerSteward::new())),
        "expansionist" => Some(Box::new(ExpansionistSteward::new())),
        _ => None,
    }
}

// === INTERACTIVE ===

fn prompt_number(prompt: &str) -> i32 {
    let stdin = io::stdin();
    loop {
        print!("{}", prompt);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return 0,
            Ok(_) => {}
        }
        match line.trim().parse() {
            Ok(n) => return n,
            Err(_) => println!("Please enter a whole number."),
        }
    }
}

fn prompt_yes(prompt: &str) -> bool {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if matches!(io::stdin().lock().read_line(&mut line), Ok(0) | Err(_)) {
        return false;
    }
    matches!(line.trim_start().as_bytes().first(), Some(b'y' | b'Y'))
}

/// Prompts the player on stdin.
pub struct InteractiveSteward;

impl Steward for InteractiveSteward {
    fn name(&self) -> &str {
        "interactive"
    }

    fn grain_for_food(&mut self, _state: &GameState) -> i32 {
        prompt_number("Grain for food = ")
    }

    fn land_deal(&mut self, _state: &GameState, bid: i32, offer: i32) -> LandDeal {
        let buy = prompt_number(&format!("Land to buy at {} HL./HA. = ", bid));
        if buy != 0 {
            return LandDeal::Buy(buy);
        }
        let sell = prompt_number(&format!("Land to sell at {} HL./HA. = ", offer));
        if sell != 0 { LandDeal::Sell(sell) } else { LandDeal::Hold }
    }

    fn land_to_plant(&mut self, _state: &GameState) -> i32 {
        prompt_number("Land to be planted = ")
    }

    fn hire_mercenaries(&mut self, _state: &GameState, rate: i32) -> i32 {
        println!("A nearby Duke threatens war!");
        prompt_number(&format!("Hire how many mercenaries at {} HL. each = ", rate))
    }

    fn answer_levy(&mut self, _state: &GameState, levied: i32, grain_instead: i32) -> LevyAnswer {
        println!(
            "The King requires {} peasants for his estates and mines.",
            levied
        );
        if prompt_yes("Will you supply them (y/n) = ") {
            LevyAnswer::SupplyPeasants
        } else {
            println!("You must pay {} HL. of grain instead.", grain_instead);
            LevyAnswer::PayGrain
        }
    }

    fn rejected(&mut self, rejection: &Rejection) {
        println!("{}", rejection);
    }
}

// === CARETAKER ===

/// Keeps the peasants fed and the granary safe; grows only by accident.
pub struct CaretakerSteward {
    backed_off: bool,
}

impl CaretakerSteward {
    pub fn new() -> Self {
        CaretakerSteward { backed_off: false }
    }

    fn take_back_off(&mut self) -> bool {
        std::mem::take(&mut self.backed_off)
    }
}

impl Default for CaretakerSteward {
    fn default() -> Self {
        Self::new()
    }
}

impl Steward for CaretakerSteward {
    fn name(&self) -> &str {
        "caretaker"
    }

    fn grain_for_food(&mut self, state: &GameState) -> i32 {
        if self.take_back_off() {
            return RATION.min(state.grain / state.peasants.max(1));
        }
        // A ration of 14 keeps resentment flat.
        (RATION + 1).min(state.grain / state.peasants.max(1))
    }

    fn land_deal(&mut self, state: &GameState, _bid: i32, offer: i32) -> LandDeal {
        if self.take_back_off() || offer < 1 {
            return LandDeal::Hold;
        }
        // Sell good land only when the granary is close to costing the
        // throne.
        if state.grain < 900 {
            let wanted = (900 - state.grain) / offer + 1;
            let cap = (SALE_CAP / offer).min(state.buckets.good_land());
            let sell = wanted.min(cap);
            if sell > 0 {
                return LandDeal::Sell(sell);
            }
        }
        LandDeal::Hold
    }

    fn land_to_plant(&mut self, state: &GameState) -> i32 {
        if self.take_back_off() {
            return 0;
        }
        (state.land * 2 / 3)
            .min(state.peasants * HECTARES_PER_PEASANT)
            .min(state.grain / SEED_PER_HECTARE)
            .max(0)
    }

    fn hire_mercenaries(&mut self, state: &GameState, rate: i32) -> i32 {
        if self.take_back_off() {
            return 0;
        }
        // Spend at most half the granary on hired swords.
        let afford = state.grain / (rate * 2);
        afford.clamp(0, MAX_MERCENARIES / 2)
    }

    fn answer_levy(&mut self, state: &GameState, _levied: i32, grain_instead: i32) -> LevyAnswer {
        if state.grain - grain_instead >= 1500 {
            LevyAnswer::PayGrain
        } else {
            LevyAnswer::SupplyPeasants
        }
    }

    fn rejected(&mut self, rejection: &Rejection) {
        info!("caretaker proposal refused: {:?}", rejection);
        self.backed_off = true;
    }
}

// === EXPANSIONIST ===

/// Feeds the bare ration and turns every spare hectolitre into land,
/// planting and soldiers.
pub struct ExpansionistSteward {
    backed_off: bool,
}

impl ExpansionistSteward {
    pub fn new() -> Self {
        ExpansionistSteward { backed_off: false }
    }

    fn take_back_off(&mut self) -> bool {
        std::mem::take(&mut self.backed_off)
    }
}

impl Default for ExpansionistSteward {
    fn default() -> Self {
        Self::new()
    }
}

impl Steward for ExpansionistSteward {
    fn name(&self) -> &str {
        "expansionist"
    }

    fn grain_for_food(&mut self, state: &GameState) -> i32 {
        RATION.min(state.grain / state.peasants.max(1))
    }

    fn land_deal(&mut self, state: &GameState, bid: i32, _offer: i32) -> LandDeal {
        if self.take_back_off() || bid < 1 {
            return LandDeal::Hold;
        }
        // Buy only with grain to spare over the deposition line.
        let spare = state.grain - 2500;
        if spare > 0 && bid <= 8 {
            let buy = (spare / bid).min(150);
            if buy > 0 {
                return LandDeal::Buy(buy);
            }
        }
        LandDeal::Hold
    }

    fn land_to_plant(&mut self, state: &GameState) -> i32 {
        if self.take_back_off() {
            return 0;
        }
        state
            .land
            .min(state.peasants * HECTARES_PER_PEASANT)
            .min(state.grain / SEED_PER_HECTARE)
            .max(0)
    }

    fn hire_mercenaries(&mut self, state: &GameState, rate: i32) -> i32 {
        if self.take_back_off() {
            return 0;
        }
        (state.grain / rate).clamp(0, MAX_MERCENARIES)
    }

    fn answer_levy(&mut self, state: &GameState, _levied: i32, grain_instead: i32) -> LevyAnswer {
        // Peasants are the engine of expansion; buy them back when possible.
        if state.grain - grain_instead > 1200 {
            LevyAnswer::PayGrain
        } else {
            LevyAnswer::SupplyPeasants
        }
    }

    fn rejected(&mut self, rejection: &Rejection) {
        info!("expansionist proposal refused: {:?}", rejection);
        self.backed_off = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_steward_by_name() {
        assert_eq!(create_steward("caretaker").unwrap().name(), "caretaker");
        assert_eq!(
            create_steward("expansionist").unwrap().name(),
            "expansionist"
        );
        assert!(create_steward("feudal-overlord").is_none());
    }

    #[test]
    fn test_caretaker_proposals_pass_validation() {
        let state = GameState::default();
        let mut steward = CaretakerSteward::new();

        let food = steward.grain_for_food(&state);
        assert!(state.check_food(food).is_ok());
        assert_eq!(food, 14);

        assert_eq!(steward.land_deal(&state, 8, 7), LandDeal::Hold);

        let plant = steward.land_to_plant(&state);
        assert!(state.check_farm(plant).is_ok());
        assert_eq!(plant, 400);

        let mercs = steward.hire_mercenaries(&state, 40);
        assert!(state.check_mercenaries(mercs).is_ok());
    }

    #[test]
    fn test_caretaker_sells_when_granary_runs_dry() {
        let state = GameState {
            grain: 500,
            ..GameState::default()
        };
        let mut steward = CaretakerSteward::new();
        match steward.land_deal(&state, 8, 7) {
            LandDeal::Sell(x) => {
                assert!(x > 0);
                assert!(state.check_sell(x, 7).is_ok());
            }
            other => panic!("expected a sale, got {:?}", other),
        }
    }

    #[test]
    fn test_expansionist_plants_to_the_limit() {
        let state = GameState::default();
        let mut steward = ExpansionistSteward::new();
        let plant = steward.land_to_plant(&state);
        assert!(state.check_farm(plant).is_ok());
        // 100 peasants farm at most 400 HA.
        assert_eq!(plant, 400);
    }

    #[test]
    fn test_stewards_back_off_after_rejection() {
        let state = GameState::default();
        let mut steward = ExpansionistSteward::new();
        steward.rejected(&Rejection::NotEnoughLand { have: 10 });
        assert_eq!(steward.land_to_plant(&state), 0);
        // The next proposal is back to normal.
        assert_eq!(steward.land_to_plant(&state), 400);
    }
}
