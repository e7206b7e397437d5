use crate::simulation::run_simulation;
use epidemic_common::{SimResult, SimulationConfig, StatsRecord};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Headline numbers of one replicate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSummary {
    pub replicate: u32,
    pub seed: u64,
    pub peak_infected: u32,
    pub peak_timestep: u32,
    /// `None` when the run has zero duration.
    pub final_stats: Option<StatsRecord>,
    /// Share of the population that left the susceptible state by the end of the run.
    pub attack_rate: Option<f64>,
}

/// Runs `replicates` independent copies of `config` in parallel.
///
/// Each replicate owns its pool and RNG; replicate `i` is seeded with
/// `base_seed + i` (wrapping), where `base_seed` is `config.seed` or a fresh
/// random value. Results come back in replicate order.
pub fn run_replicates(config: &SimulationConfig, replicates: u32) -> SimResult<Vec<ReplicateSummary>> {
    config.validate()?;
    let base_seed = config.seed.unwrap_or_else(rand::random::<u64>);
    info!(
        "Running {} replicates on {} Rayon threads (base seed {}).",
        replicates,
        rayon::current_num_threads(),
        base_seed
    );

    (0..replicates)
        .into_par_iter()
        .map(|replicate| -> SimResult<ReplicateSummary> {
            let seed = base_seed.wrapping_add(replicate as u64);
            let run_config = SimulationConfig { seed: Some(seed), ..config.clone() };
            let result = run_simulation(&run_config)?;

            let (peak_timestep, peak_infected) = result.peak_infected().unwrap_or((0, 0));
            let final_stats = result.final_stats().copied();
            let attack_rate = final_stats.map(|s| {
                (s.total() - s.susceptible) as f64 / s.total() as f64
            });
            debug!(
                "Replicate {} (seed {}): peak {} infected at step {}",
                replicate, seed, peak_infected, peak_timestep
            );

            Ok(ReplicateSummary {
                replicate,
                seed,
                peak_infected,
                peak_timestep,
                final_stats,
                attack_rate,
            })
        })
        .collect()
}
