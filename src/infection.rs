use crate::agent_pool::{Agent, AgentPool, Transition};
use epidemic_common::{SimParams, Status, Vec2};
use rand::distr::Bernoulli;
use rand::Rng;

/// Finds the susceptible agents close to a point.
///
/// The infection pass only talks to this trait, so a spatial index can replace
/// the pairwise scan without touching the transmission logic.
pub trait NeighborQuery {
    /// Calls `f` with the index of every susceptible agent strictly closer than
    /// `sqrt(max_dist_sq)` to `pos`, in ascending index order.
    fn for_each_susceptible_within<F>(&self, agents: &[Agent], pos: Vec2, max_dist_sq: f64, f: F)
    where
        F: FnMut(usize);
}

/// Checks every agent against the query point. O(N) per query, O(N²) per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseScan;

impl NeighborQuery for PairwiseScan {
    #[inline]
    fn for_each_susceptible_within<F>(&self, agents: &[Agent], pos: Vec2, max_dist_sq: f64, mut f: F)
    where
        F: FnMut(usize),
    {
        for (idx, neighbor) in agents.iter().enumerate() {
            if neighbor.status != Status::Susceptible {
                continue;
            }
            if pos.distance_squared(neighbor.position) < max_dist_sq {
                f(idx);
            }
        }
    }
}

/// Outcome counts of one infection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfectionTally {
    pub contacts: u32,
    pub new_infections: u32,
    pub recoveries: u32,
}

/// Decides this step's transitions and stores them as pending markers on the pool.
///
/// Decisions are made from the statuses as they stand after movement and written
/// to a separate buffer, so an agent marked for infection here cannot infect
/// anyone until the next step, whatever order agents are visited in. A
/// susceptible agent already marked by an earlier infector is not rolled again.
pub fn infection_step<Q, R>(
    pool: &mut AgentPool,
    query: &Q,
    params: &SimParams,
    transmission: Bernoulli,
    recovery: Bernoulli,
    rng: &mut R,
) -> InfectionTally
where
    Q: NeighborQuery + ?Sized,
    R: Rng + ?Sized,
{
    let agents = pool.agents();
    let mut pending: Vec<Option<Transition>> = vec![None; agents.len()];
    let mut tally = InfectionTally::default();

    for (idx, agent) in agents.iter().enumerate() {
        if agent.status != Status::Infected {
            continue;
        }

        query.for_each_susceptible_within(agents, agent.position, params.infection_radius_sq, |n| {
            tally.contacts += 1;
            if pending[n].is_none() && rng.sample(transmission) {
                pending[n] = Some(Transition::Infect);
                tally.new_infections += 1;
            }
        });

        if rng.sample(recovery) {
            pending[idx] = Some(Transition::Recover);
            tally.recoveries += 1;
        }
    }

    pool.mark_pending(&pending);
    tally
}
