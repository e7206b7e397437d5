use serde::{Deserialize, Serialize};
use crate::vecmath::Vec2;

/// Health state of an agent. Ordered so that valid transitions only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Susceptible,
    Infected,
    Recovered,
}

/// Position and status of one agent at the end of a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub x: f64,
    pub y: f64,
    pub status: Status,
}

impl AgentSnapshot {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Snapshot of every agent at a timestep, in pool order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub timestep: u32,
    pub agents: Vec<AgentSnapshot>,
}

/// Aggregate status counts at a timestep. The three counts always sum to the population size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    pub timestep: u32,
    pub susceptible: u32,
    pub infected: u32,
    pub recovered: u32,
}

impl StatsRecord {
    pub fn total(&self) -> u32 {
        self.susceptible + self.infected + self.recovered
    }
}

/// Full output of one run: `frames[t]` and `stats[t]` both describe timestep `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub status: String,
    pub frames: Vec<Frame>,
    pub stats: Vec<StatsRecord>,
}

pub const STATUS_SUCCESS: &str = "Success";

impl SimulationResult {
    pub fn success(frames: Vec<Frame>, stats: Vec<StatsRecord>) -> Self {
        SimulationResult { status: STATUS_SUCCESS.to_string(), frames, stats }
    }

    /// Highest infected count over the run, with the timestep it was first reached.
    pub fn peak_infected(&self) -> Option<(u32, u32)> {
        self.stats
            .iter()
            .fold(None, |best: Option<(u32, u32)>, s| match best {
                Some((_, count)) if count >= s.infected => best,
                _ => Some((s.timestep, s.infected)),
            })
    }

    pub fn final_stats(&self) -> Option<&StatsRecord> {
        self.stats.last()
    }
}
