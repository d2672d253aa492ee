use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A notable occurrence in some year of a reign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub year: i32,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    Starvation {
        starved: i32,
    },
    SevenYearLocusts {
        yield_before: i32,
        yield_after: i32,
    },
    RatsInGranary {
        eaten: i32,
    },
    KingsLevy {
        demanded: i32,
        supplied_peasants: bool,
        grain_paid: i32,
    },
    WarThreatened {
        desperation: i32,
        mercenaries_hired: i32,
    },
    FirstStrike {
        ceasefire: bool,
        casualties: i32,
    },
    WarWon {
        annexed: i32,
        captured_grain: i32,
        casualties: i32,
        landslide: bool,
    },
    WarLost {
        annexed: i32,
        casualties: i32,
    },
    BlackPlague {
        deaths: i32,
    },
    PoxEpidemic {
        deaths: i32,
    },
    YearSummary {
        peasants: i32,
        land: i32,
        grain: i32,
        crop_yield: String,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.year)?;

        match &self.event_type {
            EventType::Starvation { starved } => {
                write!(f, "Some peasants have starved ({})", starved)
            }
            EventType::SevenYearLocusts {
                yield_before,
                yield_after,
            } => {
                write!(
                    f,
                    "Seven year locusts (yield {} -> {})",
                    yield_before, yield_after
                )
            }
            EventType::RatsInGranary { eaten } => {
                write!(f, "Rats infest the granary ({} HL. eaten)", eaten)
            }
            EventType::KingsLevy {
                demanded,
                supplied_peasants,
                grain_paid,
            } => {
                if *supplied_peasants {
                    write!(f, "The king levies {} peasants", demanded)
                } else {
                    write!(
                        f,
                        "The king's levy of {} peasants bought off for {} HL.",
                        demanded, grain_paid
                    )
                }
            }
            EventType::WarThreatened {
                desperation,
                mercenaries_hired,
            } => {
                write!(
                    f,
                    "A nearby Duke threatens war (desperation {}, {} mercenaries hired)",
                    desperation, mercenaries_hired
                )
            }
            EventType::FirstStrike {
                ceasefire,
                casualties,
            } => {
                if *ceasefire {
                    write!(
                        f,
                        "First strike forces a ceasefire ({} casualties)",
                        casualties
                    )
                } else {
                    write!(f, "First strike fails; the enemy grows bolder")
                }
            }
            EventType::WarWon {
                annexed,
                captured_grain,
                casualties,
                landslide,
            } => {
                if *landslide {
                    write!(
                        f,
                        "Overran the enemy dukedom ({} HA. annexed, {} HL. captured)",
                        annexed, captured_grain
                    )
                } else {
                    write!(
                        f,
                        "War won: {} HA. annexed, {} HL. captured, {} casualties",
                        annexed, captured_grain, casualties
                    )
                }
            }
            EventType::WarLost {
                annexed,
                casualties,
            } => {
                write!(
                    f,
                    "War lost: {} HA. ceded, {} casualties",
                    -annexed, casualties
                )
            }
            EventType::BlackPlague { deaths } => {
                write!(f, "The BLACK PLAGUE has struck the area ({} deaths)", deaths)
            }
            EventType::PoxEpidemic { deaths } => {
                write!(f, "A POX EPIDEMIC has broken out ({} deaths)", deaths)
            }
            EventType::YearSummary {
                peasants,
                land,
                grain,
                crop_yield,
            } => {
                write!(
                    f,
                    "Year end - Peasants:{} Land:{} Grain:{} Yield:{}",
                    peasants, land, grain, crop_yield
                )
            }
        }
    }
}

/// Collects a reign's events; can be saved to and replayed from JSON.
#[derive(Default)]
pub struct EventLogger {
    events: Vec<Event>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, year: i32, event_type: EventType) {
        self.events.push(Event {
            timestamp: Utc::now(),
            year,
            event_type,
        });
    }

    pub fn get_events(&self) -> &[Event] {
        &self.events
    }

    pub fn save_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let events: Vec<Event> = serde_json::from_str(&json)?;
        Ok(Self { events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_events_keep_their_year() {
        let mut logger = EventLogger::new();
        logger.log(3, EventType::Starvation { starved: 7 });
        logger.log(4, EventType::RatsInGranary { eaten: 120 });

        let events = logger.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].year, 3);
        assert_eq!(events[1].year, 4);
        assert_eq!(events[0].to_string(), "[3] Some peasants have starved (7)");
    }

    #[test]
    fn chronicle_survives_a_save_and_load() {
        let mut logger = EventLogger::new();
        logger.log(
            1,
            EventType::WarWon {
                annexed: 120,
                captured_grain: 204,
                casualties: 11,
                landslide: false,
            },
        );
        logger.log(
            2,
            EventType::YearSummary {
                peasants: 104,
                land: 720,
                grain: 3911,
                crop_yield: "4.15".to_string(),
            },
        );

        let path = std::env::temp_dir().join("dukedom_chronicle_round_trip.json");
        logger.save_to_file(&path.to_string_lossy()).unwrap();
        let loaded = EventLogger::load_from_file(&path.to_string_lossy()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.get_events().len(), 2);
        assert!(matches!(
            loaded.get_events()[0].event_type,
            EventType::WarWon { annexed: 120, .. }
        ));
        assert_eq!(loaded.get_events()[1].year, 2);
    }
}
