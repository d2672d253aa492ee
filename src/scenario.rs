//! Scenario configuration: a named starting position plus run parameters,
//! loadable from JSON so reigns can be replayed and compared.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::curves::SamplerKind;
use crate::game::{GameState, RETIREMENT_YEAR};
use crate::land::{LandBuckets, TIERS};

/// A complete, self-describing run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub parameters: ReignParameters,
    pub duchy: DuchyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReignParameters {
    /// Years to simulate, at most the retirement year.
    pub years: i32,
    pub sampler: SamplerKind,
    /// Fixed seed for reproducible reigns; `None` seeds from entropy.
    pub random_seed: Option<u64>,
}

/// The duchy as the reign opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuchyConfig {
    pub peasants: i32,
    pub grain: i32,
    /// Hectares by fertility tier, best first.
    pub land_buckets: [i32; TIERS],
    pub crop_yield: Decimal,
}

impl DuchyConfig {
    pub fn into_state(self) -> GameState {
        let buckets = LandBuckets(self.land_buckets);
        GameState {
            peasants: self.peasants,
            grain: self.grain,
            land: buckets.total(),
            buckets,
            crop_yield: self.crop_yield,
            ..GameState::default()
        }
    }
}

impl Scenario {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let scenario = serde_json::from_str(&json)?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("scenario must have a name".to_string());
        }
        if self.parameters.years < 1 || self.parameters.years > RETIREMENT_YEAR {
            return Err(format!(
                "years must be between 1 and {}, got {}",
                RETIREMENT_YEAR, self.parameters.years
            ));
        }
        if self.duchy.peasants < 33 {
            return Err(format!(
                "a duchy needs at least 33 peasants, got {}",
                self.duchy.peasants
            ));
        }
        if self.duchy.grain < 429 {
            return Err(format!(
                "a duchy needs at least 429 HL of grain, got {}",
                self.duchy.grain
            ));
        }
        let land: i32 = self.duchy.land_buckets.iter().sum();
        if land < 200 {
            return Err(format!("a duchy needs at least 200 HA of land, got {}", land));
        }
        if self.duchy.land_buckets.iter().any(|&b| b < 0) {
            return Err("land buckets cannot be negative".to_string());
        }
        if self.duchy.crop_yield <= Decimal::ZERO {
            return Err(format!(
                "crop yield must be positive, got {}",
                self.duchy.crop_yield
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        writeln!(f, "  {}", self.description)?;
        writeln!(
            f,
            "  {} years, {:?} sampler, seed {:?}",
            self.parameters.years, self.parameters.sampler, self.parameters.random_seed
        )?;
        write!(
            f,
            "  {} peasants, {} HA, {} HL of grain, yield {}",
            self.duchy.peasants,
            self.duchy.land_buckets.iter().sum::<i32>(),
            self.duchy.grain,
            self.duchy.crop_yield
        )
    }
}

/// The classic start plus a couple of variants worth comparing stewards on.
pub fn create_standard_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "classic".to_string(),
            description: "The standard start: a middling duchy after a fair harvest.".to_string(),
            parameters: ReignParameters {
                years: RETIREMENT_YEAR,
                sampler: SamplerKind::Gaussian,
                random_seed: None,
            },
            duchy: DuchyConfig {
                peasants: 100,
                grain: 4177,
                land_buckets: [216, 200, 184, 0, 0, 0],
                crop_yield: dec!(3.95),
            },
        },
        Scenario {
            name: "hard-winter".to_string(),
            description: "The granary is nearly bare and last year's harvest was poor."
                .to_string(),
            parameters: ReignParameters {
                years: RETIREMENT_YEAR,
                sampler: SamplerKind::Gaussian,
                random_seed: None,
            },
            duchy: DuchyConfig {
                peasants: 90,
                grain: 1500,
                land_buckets: [180, 170, 160, 40, 30, 20],
                crop_yield: dec!(3.25),
            },
        },
        Scenario {
            name: "wide-lands".to_string(),
            description: "A sprawling duchy with more land than its peasants can farm."
                .to_string(),
            parameters: ReignParameters {
                years: RETIREMENT_YEAR,
                sampler: SamplerKind::Gaussian,
                random_seed: None,
            },
            duchy: DuchyConfig {
                peasants: 110,
                grain: 5200,
                land_buckets: [320, 300, 280, 60, 40, 0],
                crop_yield: dec!(4.1),
            },
        },
    ]
}
