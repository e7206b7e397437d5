use anyhow::Result;
use clap::Parser;
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::time::Instant;

use epidemic_common::EngineConfig;
use epidemic_engine::output::{write_batch_summary, write_stats_csv, write_trace, TraceFormat};
use epidemic_engine::{run_replicates, Simulation};

/// Command-line arguments for the engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed for the run's RNG (overrides [simulation].seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Trace format: json, bincode or messagepack (overrides [output].format)
    #[arg(long)]
    format: Option<String>,

    /// Number of independent replicates (overrides [batch].replicates)
    #[arg(long)]
    replicates: Option<u32>,
}

const LONG_RUN_PAIR_CHECKS: u64 = 10_000_000_000;

/// Upper bound on distance checks for a run (N² per step), saturating at `u64::MAX`.
fn pairwise_work(population: u32, steps: u32) -> u64 {
    let population = population as u64;
    population.saturating_mul(population).saturating_mul(steps as u64)
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Epidemic Engine...");

    // --- Load Configuration ---
    let mut config = EngineConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(format) = args.format {
        config.output.format = Some(format);
    }
    if let Some(replicates) = args.replicates {
        config.batch.replicates = replicates;
    }
    config.validate()?;
    info!("Loaded configuration from {}", args.config.display());
    if config.simulation.seed.is_none() {
        warn!("No seed configured; this run will not be reproducible.");
    }

    // --- Initialize Simulation ---
    let mut sim = Simulation::new(&config.simulation)?;
    info!("Initialized {} agents.", sim.pool().len());
    debug!("Simulation Parameters: {:#?}", sim.params());

    // --- Simulation Loop ---
    let total_steps = sim.params().duration;
    let population = sim.params().population_size;
    if pairwise_work(population, total_steps) > LONG_RUN_PAIR_CHECKS {
        warn!(
            "{} agents x {} steps uses a pairwise scan; expect a long run.",
            population, total_steps
        );
    }
    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    loop {
        let step_start_time = Instant::now();
        let Some(record) = sim.step() else { break };
        let step_duration = step_start_time.elapsed();

        // Only log at intervals or on the last step
        let print_interval_secs = 5.0;
        let should_print_status = previous_print_time.elapsed().as_secs_f64() >= print_interval_secs;
        if should_print_status || sim.is_finished() {
            info!(
                "Step [{}/{}] | S: {} I: {} R: {} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                record.timestep + 1,
                total_steps,
                record.susceptible,
                record.infected,
                record.recovered,
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = Instant::now();
        } else {
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                record.timestep + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let result = sim.into_result();
    info!("Simulation finished in {:.3} seconds.", start_time.elapsed().as_secs_f64());
    if let Some((timestep, infected)) = result.peak_infected() {
        info!("Peak of {} infected at step {}.", infected, timestep);
    }

    // --- Save Recorded Data ---
    let base = &config.output.base_filename;
    if config.output.save_trace {
        let format = TraceFormat::from_name(config.output.format.as_deref().unwrap_or("json"));
        write_trace(&result, base, format)?;
    } else {
        info!("Skipping trace as per config (save_trace is false).");
    }

    if config.output.save_stats {
        write_stats_csv(&result.stats, format!("{}_stats.csv", base))?;
    } else {
        info!("Skipping stats CSV as per config (save_stats is false).");
    }

    // --- Replicates ---
    if config.batch.replicates > 1 {
        let summaries = run_replicates(&config.simulation, config.batch.replicates)?;
        write_batch_summary(&summaries, format!("{}_batch.json", base))?;
    }

    info!("Simulation Complete.");
    Ok(())
}
