//! Agent-based SIR epidemic engine.
//!
//! A run places a population in a square world, then repeats
//! movement -> infection -> commit for a fixed number of timesteps, recording a
//! frame of every agent and a status count per step.

pub mod agent_pool;
pub mod batch;
pub mod infection;
pub mod movement;
pub mod output;
pub mod rng;
pub mod simulation;

pub use agent_pool::{Agent, AgentPool, Transition};
pub use batch::{run_replicates, ReplicateSummary};
pub use infection::{NeighborQuery, PairwiseScan};
pub use simulation::{run_simulation, Simulation};
