use crate::agent_pool::AgentPool;
use crate::infection::{infection_step, InfectionTally, NeighborQuery, PairwiseScan};
use crate::movement::movement_step;
use crate::rng::{make_rng, StepDistributions};
use epidemic_common::{
    Frame, SimError, SimParams, SimResult, SimulationConfig, SimulationResult, StatsRecord,
};
use log::{debug, trace};
use rand::rngs::StdRng;

/// Runs a complete simulation and returns its trace.
///
/// The configuration is validated before anything is allocated. After that the
/// run cannot fail and always produces exactly `duration` frames and stats.
pub fn run_simulation(config: &SimulationConfig) -> SimResult<SimulationResult> {
    Ok(Simulation::new(config)?.run())
}

/// State of one SIR run: the agents, the run's own RNG and the trace recorded so far.
pub struct Simulation<Q: NeighborQuery = PairwiseScan> {
    params: SimParams,
    pool: AgentPool,
    /// Owned by this run only; every random draw of the run comes from here.
    rng: StdRng,
    dists: StepDistributions,
    query: Q,
    current_time_step: u32,
    frames: Vec<Frame>,
    stats: Vec<StatsRecord>,
}

impl Simulation<PairwiseScan> {
    /// Validates `config`, then places a fresh population using the pairwise neighbor scan.
    pub fn new(config: &SimulationConfig) -> SimResult<Self> {
        Self::with_query(config, PairwiseScan)
    }

    /// Starts a run from an already-built pool, e.g. agents at hand-picked positions.
    /// The pool size must match `population_size`.
    pub fn from_pool(config: &SimulationConfig, pool: AgentPool) -> SimResult<Self> {
        config.validate()?;
        if pool.len() != config.population_size as usize {
            return Err(SimError::InvalidConfiguration(format!(
                "pool holds {} agents but populationSize is {}",
                pool.len(),
                config.population_size
            )));
        }
        let params = config.get_sim_params();
        let dists = StepDistributions::new(&params)?;
        Ok(Self::assemble(params, pool, make_rng(config.seed), dists, PairwiseScan))
    }
}

impl<Q: NeighborQuery> Simulation<Q> {
    /// Validates `config`, then places a fresh population searched with `query`.
    pub fn with_query(config: &SimulationConfig, query: Q) -> SimResult<Self> {
        config.validate()?;
        let params = config.get_sim_params();
        let dists = StepDistributions::new(&params)?;
        let mut rng = make_rng(config.seed);
        let pool = AgentPool::new(&params, &dists.placement, &mut rng);
        debug!(
            "Placed {} agents ({} infected) in a {}x{} world",
            pool.len(),
            params.initial_infected,
            params.world_size,
            params.world_size
        );
        Ok(Self::assemble(params, pool, rng, dists, query))
    }

    fn assemble(params: SimParams, pool: AgentPool, rng: StdRng, dists: StepDistributions, query: Q) -> Self {
        let capacity = params.duration as usize;
        Simulation {
            params,
            pool,
            rng,
            dists,
            query,
            current_time_step: 0,
            frames: Vec::with_capacity(capacity),
            stats: Vec::with_capacity(capacity),
        }
    }

    /// Advances the simulation by one timestep: movement, infection, then commit.
    /// Returns `None` without touching the run once all `duration` steps are done.
    pub fn step(&mut self) -> Option<StatsRecord> {
        if self.is_finished() {
            return None;
        }

        // --- 1. Move ---
        movement_step(&mut self.pool, &self.params, &self.dists.heading, &mut self.rng);

        // --- 2. Decide transitions from the post-movement state ---
        let tally: InfectionTally = infection_step(
            &mut self.pool,
            &self.query,
            &self.params,
            self.dists.transmission,
            self.dists.recovery,
            &mut self.rng,
        );

        // --- 3. Apply and record ---
        let record = self.commit_and_aggregate();
        trace!(
            "Step {}: {} contacts, +{} infected, +{} recovered -> S={} I={} R={}",
            record.timestep,
            tally.contacts,
            tally.new_infections,
            tally.recoveries,
            record.susceptible,
            record.infected,
            record.recovered
        );

        self.current_time_step += 1;
        Some(record)
    }

    /// Applies pending transitions, then records stats and a frame for the current timestep.
    ///
    /// The trace holds one entry per timestep: a timestep that is already recorded
    /// has its entry replaced, so calling this again before the next infection pass
    /// is a no-op. Nothing is recorded once the run is finished.
    pub fn commit_and_aggregate(&mut self) -> StatsRecord {
        self.pool.commit();
        let t = self.current_time_step;
        let record = self.pool.tally(t);
        debug_assert_eq!(record.total(), self.params.population_size);
        if self.is_finished() {
            return record;
        }

        let frame = self.pool.frame(t);
        let idx = t as usize;
        if idx < self.stats.len() {
            self.stats[idx] = record;
            self.frames[idx] = frame;
        } else {
            self.stats.push(record);
            self.frames.push(frame);
        }
        record
    }

    /// True once all `duration` timesteps have run.
    pub fn is_finished(&self) -> bool {
        self.current_time_step >= self.params.duration
    }

    /// Runs the remaining timesteps and returns the trace. There is no early exit
    /// when the epidemic dies out: the trace always has `duration` entries.
    pub fn run(mut self) -> SimulationResult {
        while !self.is_finished() {
            self.step();
        }
        debug!(
            "Run finished after {} steps, final counts {:?}",
            self.current_time_step,
            self.stats.last()
        );
        self.into_result()
    }

    pub fn into_result(self) -> SimulationResult {
        SimulationResult::success(self.frames, self.stats)
    }

    pub fn pool(&self) -> &AgentPool {
        &self.pool
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn current_time_step(&self) -> u32 {
        self.current_time_step
    }

    pub fn stats(&self) -> &[StatsRecord] {
        &self.stats
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
