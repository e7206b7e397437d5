use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use crate::error::{SimError, SimResult};
use crate::sim_params::{SimParams, INFECTION_RADIUS, INITIAL_INFECTED, WORLD_SIZE};
use std::path::Path;

/// Parameters of a single simulation run.
///
/// Field names on the wire are camelCase (`populationSize`, ...) since this is the
/// shape the visualizer posts; the snake_case spellings are accepted as aliases so
/// hand-written TOML files can use either.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(alias = "population_size")]
    pub population_size: u32,
    /// Number of timesteps to run. Zero is allowed and produces an empty trace.
    pub duration: u32,
    #[serde(alias = "movement_speed")]
    pub movement_speed: f64,
    #[serde(alias = "transmission_rate")]
    pub transmission_rate: f64,
    #[serde(alias = "recovery_rate")]
    pub recovery_rate: f64,
    /// Seed for the run's RNG. When absent the run is seeded from the OS and is not reproducible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            population_size: 200,
            duration: 100,
            movement_speed: 2.0,
            transmission_rate: 0.3,
            recovery_rate: 0.05,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Rejects configurations the engine cannot run meaningfully.
    pub fn validate(&self) -> SimResult<()> {
        if self.population_size == 0 {
            return Err(SimError::InvalidConfiguration(
                "populationSize must be greater than 0".to_string(),
            ));
        }
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "movementSpeed must be a finite value >= 0, got {}",
                self.movement_speed
            )));
        }
        check_probability("transmissionRate", self.transmission_rate)?;
        check_probability("recoveryRate", self.recovery_rate)?;
        Ok(())
    }

    /// Converts the configuration into the parameters read by the simulation loop.
    pub fn get_sim_params(&self) -> SimParams {
        SimParams {
            world_size: WORLD_SIZE,
            infection_radius_sq: INFECTION_RADIUS * INFECTION_RADIUS,
            transmission_rate: self.transmission_rate,
            recovery_rate: self.recovery_rate,
            initial_infected: INITIAL_INFECTED.min(self.population_size),
            movement_speed: self.movement_speed,
            population_size: self.population_size,
            duration: self.duration,
        }
    }
}

fn check_probability(name: &str, value: f64) -> SimResult<()> {
    // NaN fails `contains` as well.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidConfiguration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    /// Write the full frame/stats trace.
    #[serde(default = "default_true")]
    pub save_trace: bool,
    /// Write the stats series as CSV.
    #[serde(default = "default_true")]
    pub save_stats: bool,
    pub format: Option<String>, // Trace format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: default_base_filename(),
            save_trace: true,
            save_stats: true,
            format: None,
        }
    }
}

fn default_base_filename() -> String {
    "epidemic".to_string()
}

fn default_true() -> bool {
    true
}

// Replicate runs of the same configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BatchConfig {
    #[serde(default = "default_replicates")]
    pub replicates: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { replicates: default_replicates() }
    }
}

fn default_replicates() -> u32 {
    1
}

/// Top-level run file, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Loads the run configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid config file '{}'", path_ref.display()))
    }

    /// Parses and validates a run configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        if self.batch.replicates == 0 {
            anyhow::bail!("batch.replicates must be greater than 0.");
        }
        if self.output.base_filename.trim().is_empty() {
            anyhow::bail!("output.base_filename must not be empty.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
[simulation]
populationSize = 120
duration = 50
movementSpeed = 1.5
transmissionRate = 0.25
recoveryRate = 0.1
seed = 7

[output]
base_filename = "run_a"
save_trace = true
save_stats = false
format = "bincode"

[batch]
replicates = 4
"#;

    #[test]
    fn parses_full_file() {
        let config = EngineConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.simulation.population_size, 120);
        assert_eq!(config.simulation.duration, 50);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.output.base_filename, "run_a");
        assert!(!config.output.save_stats);
        assert_eq!(config.output.format.as_deref(), Some("bincode"));
        assert_eq!(config.batch.replicates, 4);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let text = r#"
[simulation]
population_size = 10
duration = 5
movement_speed = 0.0
transmission_rate = 1.0
recovery_rate = 0.0
"#;
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.simulation.population_size, 10);
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.batch.replicates, 1);
    }

    #[test]
    fn rejects_zero_population() {
        let config = SimulationConfig { population_size: 0, ..SimulationConfig::default() };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        for bad in [-0.1, 1.01, f64::NAN] {
            let t = SimulationConfig { transmission_rate: bad, ..SimulationConfig::default() };
            assert!(t.validate().is_err(), "transmission {bad} accepted");
            let r = SimulationConfig { recovery_rate: bad, ..SimulationConfig::default() };
            assert!(r.validate().is_err(), "recovery {bad} accepted");
        }
        let edges = SimulationConfig {
            transmission_rate: 0.0,
            recovery_rate: 1.0,
            ..SimulationConfig::default()
        };
        assert!(edges.validate().is_ok());
    }

    #[test]
    fn rejects_negative_or_infinite_speed() {
        for bad in [-1.0, f64::INFINITY, f64::NAN] {
            let config = SimulationConfig { movement_speed: bad, ..SimulationConfig::default() };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn zero_duration_is_valid() {
        let config = SimulationConfig { duration: 0, ..SimulationConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_replicates() {
        let text = FULL.replace("replicates = 4", "replicates = 0");
        assert!(EngineConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn sim_params_cap_initial_infected_at_population() {
        let config = SimulationConfig { population_size: 2, ..SimulationConfig::default() };
        let params = config.get_sim_params();
        assert_eq!(params.initial_infected, 2);
        assert_eq!(params.infection_radius_sq, INFECTION_RADIUS * INFECTION_RADIUS);
        assert_eq!(params.world_size, WORLD_SIZE);
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.simulation.transmission_rate, 0.25);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn wire_names_are_camel_case() {
        let config = SimulationConfig { seed: Some(3), ..SimulationConfig::default() };
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("populationSize"));
        assert!(text.contains("transmissionRate"));
    }
}
