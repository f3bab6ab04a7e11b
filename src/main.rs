use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use signal_tuner::simulation::{
    report, AlternatingGreen, LaunchOption, RunAggregator, RunConfig, Session,
    SignalProgramEditor, SumoHome, DEFAULT_CONFIG_FILE, DEFAULT_EVEN_GREEN, DEFAULT_ODD_GREEN,
    DEFAULT_STEP_BUDGET,
};
use signal_tuner::traci;

#[derive(Parser)]
#[command(name = "signal_tuner")]
#[command(about = "Retime traffic lights and measure a simulation run")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step the simulation and print a metrics report
    Run {
        /// Scenario configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Number of simulation steps
        #[arg(long, default_value_t = DEFAULT_STEP_BUDGET)]
        steps: u32,

        /// Use the graphical simulator
        #[arg(long)]
        gui: bool,

        /// Rewrite green phase durations before stepping
        #[arg(long)]
        retime: bool,

        /// Green duration for traffic lights at even positions
        #[arg(long, default_value_t = DEFAULT_EVEN_GREEN)]
        even_green: f64,

        /// Green duration for traffic lights at odd positions
        #[arg(long, default_value_t = DEFAULT_ODD_GREEN)]
        odd_green: f64,

        /// Extra simulator option as NAME=true|false (repeatable)
        #[arg(long = "option", value_parser = LaunchOption::parse)]
        options: Vec<LaunchOption>,
    },

    /// Print the default program of every traffic light
    Inspect {
        /// Scenario configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Use the graphical simulator
        #[arg(long)]
        gui: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,signal_tuner=info"),
    )
    .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            steps,
            gui,
            retime,
            even_green,
            odd_green,
            options,
        } => build_config(config, gui, options).and_then(|mut run_config| {
            run_config.step_budget = steps;
            let policy = AlternatingGreen {
                even: even_green,
                odd: odd_green,
            };
            run(&run_config, retime.then_some(policy))
        }),
        Commands::Inspect { config, gui } => {
            build_config(config, gui, Vec::new()).and_then(|run_config| inspect(&run_config))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Gather startup inputs; nothing is launched if any of them is missing
fn build_config(config: PathBuf, gui: bool, options: Vec<LaunchOption>) -> Result<RunConfig> {
    let sumo_home = SumoHome::from_env()?;
    let mut run_config = RunConfig::new(sumo_home, config);
    run_config.gui = gui;
    for option in options {
        run_config.set_option(option);
    }
    run_config.validate()?;
    Ok(run_config)
}

/// Optionally retime, then run the step loop and print the report
fn run(config: &RunConfig, retime: Option<AlternatingGreen>) -> Result<()> {
    println!("Starting simulation...");
    let client = traci::launch(config).context("Failed to start the simulator")?;
    let mut session = Session::open(client);

    if let Some(policy) = retime {
        let summary = SignalProgramEditor::new(policy)
            .rewrite_all_programs(&mut session)
            .context("Failed to rewrite signal programs")?;
        println!("{}", summary);
        println!("{}", "=".repeat(50));
        println!("Modifications complete. Running simulation with new timers...");
    }

    let stats = RunAggregator::new(config.step_budget)
        .run(&mut session)
        .context("Simulation run aborted")?;
    session.close().context("Failed to close the simulator")?;

    println!();
    println!("{}", stats);
    Ok(())
}

/// Print every traffic light's default program without changing anything
fn inspect(config: &RunConfig) -> Result<()> {
    info!("Loading network geometry...");
    let client = traci::launch(config).context("Failed to start the simulator")?;
    let mut session = Session::open(client);

    let inspections = SignalProgramEditor::new(AlternatingGreen::default())
        .inspect_programs(&mut session)
        .context("Failed to read signal programs")?;
    session.close().context("Failed to close the simulator")?;

    print!("{}", report::inspection_report(&inspections));
    Ok(())
}
