use epidemic_common::{SimError, SimParams, SimResult};
use rand::distr::{Bernoulli, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Builds the RNG owned by one run. Without a seed the run draws its seed from the OS.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Distributions sampled by the simulation loop, built once per run.
#[derive(Debug, Clone)]
pub struct StepDistributions {
    /// Initial placement on either axis, `[0, world_size]`.
    pub placement: Uniform<f64>,
    /// Movement heading, `[0, 2π)`.
    pub heading: Uniform<f64>,
    pub transmission: Bernoulli,
    pub recovery: Bernoulli,
}

impl StepDistributions {
    pub fn new(params: &SimParams) -> SimResult<Self> {
        let placement = Uniform::new_inclusive(0.0, params.world_size)
            .map_err(|e| invalid("world size", e))?;
        let heading = Uniform::new(0.0, std::f64::consts::TAU)
            .map_err(|e| invalid("heading range", e))?;
        let transmission = Bernoulli::new(params.transmission_rate)
            .map_err(|e| invalid("transmissionRate", e))?;
        let recovery = Bernoulli::new(params.recovery_rate)
            .map_err(|e| invalid("recoveryRate", e))?;
        Ok(StepDistributions { placement, heading, transmission, recovery })
    }
}

fn invalid(what: &str, e: impl std::fmt::Display) -> SimError {
    SimError::InvalidConfiguration(format!("{}: {}", what, e))
}
