pub mod config;
pub mod error;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{BatchConfig, EngineConfig, OutputConfig, SimulationConfig};
pub use error::{SimError, SimResult};
pub use sim_params::{SimParams, INFECTION_RADIUS, INITIAL_INFECTED, WORLD_SIZE};
pub use snapshot::{AgentSnapshot, Frame, SimulationResult, StatsRecord, Status, STATUS_SUCCESS};
pub use vecmath::{angle_to_vec, clamp, Vec2};
