use std::process;

use log::{error, info};

use dukedom_model::cli::{self, CliArgs, Command};
use dukedom_model::events::EventLogger;
use dukedom_model::game::step;
use dukedom_model::report::GameReport;
use dukedom_model::scenario::{Scenario, create_standard_scenarios};
use dukedom_model::strategies::create_steward;
use dukedom_model::ui::run_ui;

fn main() {
    env_logger::init();

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error parsing arguments: {}", err);
            process::exit(1);
        }
    };

    match args.command.clone() {
        Command::Run => run(args),
        Command::Ui { file } => {
            if let Err(err) = run_ui(&file.to_string_lossy()) {
                eprintln!("UI error: {}", err);
                process::exit(1);
            }
        }
    }
}

fn load_scenario(args: &CliArgs) -> Scenario {
    let mut scenario = if let Some(path) = &args.scenario_file {
        match Scenario::load_from_file(path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("Failed to load scenario from {}: {}", path.display(), err);
                process::exit(1);
            }
        }
    } else {
        let scenarios = create_standard_scenarios();
        match scenarios.iter().find(|s| s.name == args.scenario_name) {
            Some(scenario) => scenario.clone(),
            None => {
                eprintln!("Unknown scenario '{}'. Available:", args.scenario_name);
                for s in &scenarios {
                    eprintln!("  {} - {}", s.name, s.description);
                }
                process::exit(1);
            }
        }
    };

    cli::apply_overrides(&mut scenario, args);
    if let Err(err) = scenario.validate() {
        eprintln!("Invalid scenario: {}", err);
        process::exit(1);
    }
    scenario
}

fn run(args: CliArgs) {
    let scenario = load_scenario(&args);

    let seed = scenario
        .parameters
        .random_seed
        .unwrap_or_else(rand::random);
    info!("scenario '{}', seed {}", scenario.name, seed);

    let mut sampler = scenario.parameters.sampler.build(seed);
    let mut steward = match create_steward(&args.steward) {
        Some(steward) => steward,
        None => {
            eprintln!(
                "Unknown steward '{}'. Available: interactive, caretaker, expansionist",
                args.steward
            );
            process::exit(1);
        }
    };

    let mut state = scenario.duchy.clone().into_state();
    let mut events = EventLogger::new();

    if !args.quiet {
        println!("D U K E D O M\n");
        println!("{}", scenario.description);
    }
    if args.show_ledgers() {
        println!("\nThe chamberlain reports on the year just past:");
        print!("{}", GameReport::year_zero().render(&state.buckets));
    }

    let outcome = loop {
        if state.year >= scenario.parameters.years {
            break None;
        }
        if !args.quiet {
            println!(
                "\nYear {} Peasants {} Land {} Grain {}",
                state.year + 1,
                state.peasants,
                state.land,
                state.grain
            );
        }
        match step(
            &mut state,
            sampler.as_mut(),
            steward.as_mut(),
            &mut events,
        ) {
            Ok(report) => {
                if args.show_ledgers() {
                    print!("{}", report.render(&state.buckets));
                }
            }
            Err(end) => break Some(end),
        }
    };

    match outcome {
        Some(end) => {
            println!("\n{}", end);
            error!("reign ended in year {}: {:?}", state.year, end);
        }
        None => {
            println!(
                "\nYour reign of {} years is over.\n\
                 You leave {} peasants, {} HA. of land\n\
                 and {} HL. of grain to your heir.",
                state.year, state.peasants, state.land, state.grain
            );
        }
    }

    let output = args
        .output_file
        .unwrap_or_else(|| std::path::PathBuf::from("dukedom_events.json"));
    match events.save_to_file(&output.to_string_lossy()) {
        Ok(()) => {
            if !args.quiet {
                println!("\nChronicle written to {}", output.display());
            }
        }
        Err(err) => eprintln!("Failed to write chronicle: {}", err),
    }
}
