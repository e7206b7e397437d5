use serde::{Deserialize, Serialize};

/// Side length of the square world, in world units.
pub const WORLD_SIZE: f64 = 500.0;
/// Maximum distance at which an infected agent can transmit.
pub const INFECTION_RADIUS: f64 = 15.0;
/// Number of agents (lowest pool indices) that start infected.
pub const INITIAL_INFECTED: u32 = 3;

/// Runtime parameters derived from a validated configuration, read on every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // World
    pub world_size: f64,

    // Infection
    pub infection_radius_sq: f64,
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    pub initial_infected: u32,

    // Movement
    pub movement_speed: f64, // world units per timestep

    // Run
    pub population_size: u32,
    pub duration: u32,
}
