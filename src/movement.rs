use crate::agent_pool::AgentPool;
use epidemic_common::{angle_to_vec, SimParams};
use rand::distr::Uniform;
use rand::Rng;

/// Moves every agent one step of `movement_speed` along a fresh random heading.
///
/// Each axis is clamped to `[0, world_size]` afterwards. An agent pushed through a
/// wall stops on it and keeps no memory of the direction, so agents can sit on an
/// edge for several steps in a row.
pub fn movement_step<R: Rng + ?Sized>(
    pool: &mut AgentPool,
    params: &SimParams,
    heading: &Uniform<f64>,
    rng: &mut R,
) {
    for agent in pool.agents_mut() {
        let theta = rng.sample(heading);
        let tentative = agent.position + angle_to_vec(theta).scale(params.movement_speed);
        agent.position = tentative.clamp_to(0.0, params.world_size);
    }
}
