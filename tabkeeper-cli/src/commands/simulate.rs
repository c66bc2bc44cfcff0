//! Randomized tab model simulation command.

use tabkeeper_core::{SimulationConfig, SimulationReport, Simulator};

use crate::error::CliError;
use crate::util::{GlobalArgs, load_settings};

/// Parameters for the simulate command
pub struct SimulateParams {
    pub seed: Option<u64>,
    pub steps: Option<usize>,
    pub log: bool,
    pub quiet: bool,
}

/// Simulate command handler
pub fn cmd_simulate(args: GlobalArgs<'_>, params: SimulateParams) -> Result<(), CliError> {
    let settings = load_settings(args.config_dir)?;
    let mut config = SimulationConfig::from_settings(&settings.simulation, params.seed);
    if let Some(steps) = params.steps {
        config.steps = steps;
    }

    let mut simulator = Simulator::new(&config)?;
    let seed = simulator.seed();
    if !params.quiet {
        println!("Seed: {seed}");
    }

    for _ in 0..config.steps {
        match simulator.step() {
            Ok(line) => {
                if params.log {
                    println!("{line}");
                }
            }
            Err(e) => {
                if !params.quiet {
                    eprintln!("Replay with: tabkeeper-cli simulate --seed {seed} --log");
                }
                return Err(e.into());
            }
        }
    }

    let report = simulator.run()?;
    if !params.quiet {
        println!("{}", format_report(&report));
    }
    Ok(())
}

/// Summary lines for a finished run
#[must_use]
pub fn format_report(report: &SimulationReport) -> String {
    format!(
        "Steps: {}\nRegular tabs: {}\nIncognito tabs: {}\nPending closures: {}\nGroups: {}",
        report.steps,
        report.regular_tabs,
        report.incognito_tabs,
        report.pending_closures,
        report.groups
    )
}
