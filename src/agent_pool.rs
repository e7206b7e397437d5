use epidemic_common::{AgentSnapshot, Frame, SimParams, StatsRecord, Status, Vec2};
use rand::distr::Uniform;
use rand::Rng;

/// A status change decided during the infection pass and applied at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Infect,
    Recover,
}

impl Transition {
    /// Status the agent holds once the transition is committed.
    pub fn target(self) -> Status {
        match self {
            Transition::Infect => Status::Infected,
            Transition::Recover => Status::Recovered,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec2,
    pub status: Status,
    /// Set by the infection pass, cleared by commit. `None` between timesteps.
    pub pending_status: Option<Transition>,
}

impl Agent {
    pub fn new(position: Vec2, status: Status) -> Self {
        Agent { position, status, pending_status: None }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot { x: self.position.x, y: self.position.y, status: self.status }
    }
}

/// Owns every agent of a run. Indices are stable: agents are never added or removed.
#[derive(Debug, Clone)]
pub struct AgentPool {
    agents: Vec<Agent>,
}

impl AgentPool {
    /// Places `params.population_size` agents uniformly at random in the world and
    /// infects the first `params.initial_infected` of them.
    pub fn new<R: Rng + ?Sized>(params: &SimParams, placement: &Uniform<f64>, rng: &mut R) -> Self {
        let positions: Vec<Vec2> = (0..params.population_size)
            .map(|_| Vec2::new(rng.sample(placement), rng.sample(placement)))
            .collect();
        Self::from_positions(positions, params.initial_infected)
    }

    /// Builds a pool at fixed positions. Seeding is positional: indices
    /// `0..initial_infected` start infected, the rest susceptible.
    pub fn from_positions(positions: Vec<Vec2>, initial_infected: u32) -> Self {
        let agents = positions
            .into_iter()
            .enumerate()
            .map(|(idx, position)| {
                let status = if idx < initial_infected as usize {
                    Status::Infected
                } else {
                    Status::Susceptible
                };
                Agent::new(position, status)
            })
            .collect();
        AgentPool { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Copies a buffer of decided transitions onto the agents' pending markers.
    /// `pending` must be index-aligned with the pool.
    pub(crate) fn mark_pending(&mut self, pending: &[Option<Transition>]) {
        assert_eq!(
            pending.len(),
            self.agents.len(),
            "pending buffer does not match pool size"
        );
        for (agent, mark) in self.agents.iter_mut().zip(pending) {
            if mark.is_some() {
                agent.pending_status = *mark;
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.agents.iter().any(|a| a.pending_status.is_some())
    }

    /// Applies every pending transition and clears the markers.
    /// Returns how many agents changed status; a second call without a new
    /// infection pass returns 0.
    pub fn commit(&mut self) -> usize {
        let mut applied = 0;
        for agent in &mut self.agents {
            if let Some(transition) = agent.pending_status.take() {
                agent.status = transition.target();
                applied += 1;
            }
        }
        applied
    }

    /// Counts agents per status.
    pub fn tally(&self, timestep: u32) -> StatsRecord {
        let mut record = StatsRecord { timestep, ..StatsRecord::default() };
        for agent in &self.agents {
            match agent.status {
                Status::Susceptible => record.susceptible += 1,
                Status::Infected => record.infected += 1,
                Status::Recovered => record.recovered += 1,
            }
        }
        record
    }

    pub fn frame(&self, timestep: u32) -> Frame {
        Frame {
            timestep,
            agents: self.agents.iter().map(Agent::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epidemic_common::SimulationConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(population_size: u32) -> SimParams {
        SimulationConfig { population_size, ..SimulationConfig::default() }.get_sim_params()
    }

    #[test]
    fn first_three_agents_start_infected() {
        let params = params(10);
        let placement = Uniform::new_inclusive(0.0, params.world_size).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let pool = AgentPool::new(&params, &placement, &mut rng);

        assert_eq!(pool.len(), 10);
        for (idx, agent) in pool.agents().iter().enumerate() {
            let expected = if idx < 3 { Status::Infected } else { Status::Susceptible };
            assert_eq!(agent.status, expected, "agent {idx}");
            assert!(agent.pending_status.is_none());
            assert!((0.0..=params.world_size).contains(&agent.position.x));
            assert!((0.0..=params.world_size).contains(&agent.position.y));
        }
    }

    #[test]
    fn small_population_is_entirely_infected() {
        let params = params(2);
        let placement = Uniform::new_inclusive(0.0, params.world_size).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let pool = AgentPool::new(&params, &placement, &mut rng);
        let stats = pool.tally(0);
        assert_eq!(stats.infected, 2);
        assert_eq!(stats.susceptible, 0);
    }

    #[test]
    fn commit_applies_then_becomes_noop() {
        let mut pool = AgentPool::from_positions(vec![Vec2::zero(); 5], 3);
        let mut pending = vec![None; 5];
        pending[0] = Some(Transition::Recover);
        pending[4] = Some(Transition::Infect);
        pool.mark_pending(&pending);
        assert!(pool.has_pending());

        assert_eq!(pool.commit(), 2);
        assert!(!pool.has_pending());
        let after_first = pool.agents().to_vec();
        assert_eq!(after_first[0].status, Status::Recovered);
        assert_eq!(after_first[4].status, Status::Infected);

        assert_eq!(pool.commit(), 0);
        assert_eq!(pool.agents(), after_first.as_slice());
    }

    #[test]
    #[should_panic(expected = "pending buffer does not match pool size")]
    fn mark_pending_rejects_misaligned_buffer() {
        let mut pool = AgentPool::from_positions(vec![Vec2::zero(); 4], 1);
        pool.mark_pending(&[None, Some(Transition::Infect)]);
    }

    #[test]
    fn tally_and_frame_follow_pool_order() {
        let positions = vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)];
        let mut pool = AgentPool::from_positions(positions, 1);
        pool.agents_mut()[2].status = Status::Recovered;

        let stats = pool.tally(4);
        assert_eq!(stats, StatsRecord { timestep: 4, susceptible: 1, infected: 1, recovered: 1 });

        let frame = pool.frame(4);
        assert_eq!(frame.timestep, 4);
        let statuses: Vec<Status> = frame.agents.iter().map(|a| a.status).collect();
        assert_eq!(statuses, vec![Status::Infected, Status::Susceptible, Status::Recovered]);
        assert_eq!(frame.agents[1].position(), Vec2::new(2.0, 2.0));
    }
}
