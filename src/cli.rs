//! Command-line interface for the dukedom simulation.

use std::path::PathBuf;

use lexopt::prelude::*;

use crate::game::RETIREMENT_YEAR;
use crate::scenario::Scenario;

/// Command-line arguments for a run.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
    pub steward: String,
    pub scenario_name: String,
    pub scenario_file: Option<PathBuf>,
    pub years: Option<i32>,
    pub sampler: Option<String>,
    pub random_seed: Option<u64>,
    pub quiet: bool,
    pub skip_report: bool,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Run,
    Ui { file: PathBuf },
}

impl CliArgs {
    /// Whether the messenger's detailed ledgers should be printed,
    /// both the year-zero one and the per-year ones.
    pub fn show_ledgers(&self) -> bool {
        !self.quiet && !self.skip_report
    }
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            command: Command::Run,
            steward: "interactive".to_string(),
            scenario_name: "classic".to_string(),
            scenario_file: None,
            years: None,
            sampler: None,
            random_seed: None,
            quiet: false,
            skip_report: false,
            output_file: None,
        }
    }
}

pub fn parse_args() -> Result<CliArgs, lexopt::Error> {
    let mut args = lexopt::Parser::from_env();
    let mut cli_args = CliArgs::default();
    let mut subcommand = None;
    let mut ui_file = None;

    while let Some(arg) = args.next()? {
        match arg {
            Value(val) => {
                let val_str = val.string()?;
                if subcommand.is_none() {
                    subcommand = Some(val_str);
                } else if subcommand.as_deref() == Some("ui") {
                    ui_file = Some(PathBuf::from(val_str));
                }
            }
            Long("steward") | Short('s') => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.steward = val.string()?;
                }
            }
            Long("scenario") => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.scenario_name = val.string()?;
                }
            }
            Long("scenario-file") => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.scenario_file = Some(PathBuf::from(val.string()?));
                }
            }
            Long("years") | Short('y') => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.years = Some(val.parse()?);
                }
            }
            Long("sampler") => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.sampler = Some(val.string()?);
                }
            }
            Long("seed") => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.random_seed = Some(val.parse()?);
                }
            }
            Long("quiet") | Short('q') => cli_args.quiet = true,
            Long("skip-report") => cli_args.skip_report = true,
            Long("output") | Short('o') => {
                if let Some(Value(val)) = args.next()? {
                    cli_args.output_file = Some(PathBuf::from(val.string()?));
                }
            }
            Long("help") | Short('h') => {
                print_help();
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    cli_args.command = match subcommand.as_deref() {
        Some("ui") => Command::Ui {
            file: ui_file.unwrap_or_else(|| PathBuf::from("dukedom_events.json")),
        },
        Some("run") | None => Command::Run,
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_help();
            std::process::exit(1);
        }
    };

    Ok(cli_args)
}

/// Apply CLI overrides to a loaded scenario.
pub fn apply_overrides(scenario: &mut Scenario, args: &CliArgs) {
    if let Some(years) = args.years {
        scenario.parameters.years = years.min(RETIREMENT_YEAR);
    }
    if let Some(seed) = args.random_seed {
        scenario.parameters.random_seed = Some(seed);
    }
    if let Some(sampler) = args.sampler.as_deref() {
        match sampler {
            "gaussian" => scenario.parameters.sampler = crate::curves::SamplerKind::Gaussian,
            "talbot" => scenario.parameters.sampler = crate::curves::SamplerKind::Talbot,
            other => eprintln!("Unknown sampler '{}', keeping {:?}", other, scenario.parameters.sampler),
        }
    }
}

fn print_help() {
    println!("\nDukedom - a reign simulation\n");
    println!("USAGE:");
    println!("    dukedom-sim [COMMAND] [OPTIONS]\n");

    println!("COMMANDS:");
    println!("    run              Play or simulate a reign (default)");
    println!("    ui [FILE]        Replay a saved reign's events in a TUI\n");

    println!("OPTIONS:");
    println!("    -s, --steward <NAME>       Who rules: interactive (default), caretaker,");
    println!("                               expansionist");
    println!("    --scenario <NAME>          Use a built-in scenario (default: classic)");
    println!("    --scenario-file <FILE>     Load scenario from JSON file");
    println!("    -y, --years <N>            Years to simulate (at most {})", RETIREMENT_YEAR);
    println!("    --sampler <NAME>           Chance curves: gaussian (default) or talbot");
    println!("    --seed <N>                 Random seed for reproducible reigns");
    println!("    -o, --output <FILE>        Write the event log to the given file");
    println!("    -q, --quiet                Suppress the yearly report");
    println!("    --skip-report              Skip the detailed ledgers, yearly and year-zero");
    println!("    -h, --help                 Print help information\n");

    println!("UI CONTROLS:");
    println!("    Space            Pause/Resume playback");
    println!("    ←/→              Step backward/forward through events");
    println!("    Home/End         Jump to beginning/end");
    println!("    Q                Quit\n");

    println!("EXAMPLES:");
    println!("    # Play at the terminal");
    println!("    dukedom-sim run\n");

    println!("    # Watch a caretaker regency with a fixed seed");
    println!("    dukedom-sim run -s caretaker --seed 1984 -o reign.json\n");

    println!("    # Replay it afterwards");
    println!("    dukedom-sim ui reign.json");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::SamplerKind;
    use crate::scenario::create_standard_scenarios;

    #[test]
    fn test_overrides_apply_to_scenario() {
        let mut scenario = create_standard_scenarios()[0].clone();
        let args = CliArgs {
            years: Some(10),
            random_seed: Some(42),
            sampler: Some("talbot".to_string()),
            ..CliArgs::default()
        };
        apply_overrides(&mut scenario, &args);
        assert_eq!(scenario.parameters.years, 10);
        assert_eq!(scenario.parameters.random_seed, Some(42));
        assert_eq!(scenario.parameters.sampler, SamplerKind::Talbot);
    }

    #[test]
    fn test_years_override_is_capped() {
        let mut scenario = create_standard_scenarios()[0].clone();
        let args = CliArgs {
            years: Some(500),
            ..CliArgs::default()
        };
        apply_overrides(&mut scenario, &args);
        assert_eq!(scenario.parameters.years, RETIREMENT_YEAR);
    }

    #[test]
    fn test_skip_report_silences_the_ledgers() {
        let mut args = CliArgs::default();
        assert!(args.show_ledgers());
        args.skip_report = true;
        assert!(!args.show_ledgers());
        args.skip_report = false;
        args.quiet = true;
        assert!(!args.show_ledgers());
    }
}
