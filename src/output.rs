use crate::batch::ReplicateSummary;
use anyhow::{Context, Result};
use epidemic_common::{SimulationResult, StatsRecord};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encodings of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Json,
    Bincode,
    MessagePack,
}

impl TraceFormat {
    /// Parses a format name. Unknown names log an error and fall back to JSON.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => TraceFormat::Json,
            "bincode" => TraceFormat::Bincode,
            "messagepack" | "msgpack" => TraceFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                TraceFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TraceFormat::Json => "json",
            TraceFormat::Bincode => "bin",
            TraceFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes the full trace to `<base>_trace.<ext>` and returns the path written.
pub fn write_trace(result: &SimulationResult, base_filename: &str, format: TraceFormat) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_trace.{}", base_filename, format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("Error creating trace file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        TraceFormat::Json => serde_json::to_writer(&mut writer, result)
            .context("Error serializing trace to JSON")?,
        TraceFormat::Bincode => bincode::serialize_into(&mut writer, result)
            .context("Error serializing trace to bincode")?,
        TraceFormat::MessagePack => rmp_serde::encode::write_named(&mut writer, result)
            .context("Error serializing trace to MessagePack")?,
    }
    writer.flush()
        .with_context(|| format!("Error writing trace file '{}'", path.display()))?;

    info!("Trace with {} frames saved to {} ({:?} format)", result.frames.len(), path.display(), format);
    Ok(path)
}

/// Writes the stats series as CSV with a `timestep,susceptible,infected,recovered` header.
pub fn write_stats_csv<P: AsRef<Path>>(stats: &[StatsRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    if stats.is_empty() {
        writer.write_record(["timestep", "susceptible", "infected", "recovered"])?;
    }
    for record in stats {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Stats for {} timesteps saved to {}", stats.len(), path.display());
    Ok(())
}

pub fn write_batch_summary<P: AsRef<Path>>(summaries: &[ReplicateSummary], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Error creating batch summary '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summaries)
        .context("Error serializing batch summary to JSON")?;
    writer.flush()
        .with_context(|| format!("Error writing batch summary '{}'", path.display()))?;
    info!("Summary of {} replicates saved to {}", summaries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::run_simulation;
    use epidemic_common::SimulationConfig;

    fn small_result() -> SimulationResult {
        run_simulation(&SimulationConfig {
            population_size: 8,
            duration: 4,
            seed: Some(5),
            ..SimulationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn format_names_parse_with_json_fallback() {
        assert_eq!(TraceFormat::from_name("JSON"), TraceFormat::Json);
        assert_eq!(TraceFormat::from_name("bincode"), TraceFormat::Bincode);
        assert_eq!(TraceFormat::from_name("msgpack"), TraceFormat::MessagePack);
        assert_eq!(TraceFormat::from_name("yaml"), TraceFormat::Json);
    }

    #[test]
    fn json_trace_is_readable_by_consumers() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let result = small_result();

        let path = write_trace(&result, base.to_str().unwrap(), TraceFormat::Json).unwrap();
        assert!(path.ends_with("run_trace.json"));

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "Success");
        assert_eq!(value["frames"].as_array().unwrap().len(), 4);
        assert_eq!(value["frames"][3]["agents"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn binary_traces_decode_back() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let result = small_result();

        let bin = write_trace(&result, base.to_str().unwrap(), TraceFormat::Bincode).unwrap();
        let decoded: SimulationResult = bincode::deserialize_from(File::open(bin).unwrap()).unwrap();
        assert_eq!(decoded, result);

        let mp = write_trace(&result, base.to_str().unwrap(), TraceFormat::MessagePack).unwrap();
        let decoded: SimulationResult = rmp_serde::from_read(File::open(mp).unwrap()).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn stats_csv_has_header_and_one_row_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        let result = small_result();

        write_stats_csv(&result.stats, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestep,susceptible,infected,recovered"));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn batch_summary_is_complete_on_return() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let cfg = SimulationConfig { population_size: 12, duration: 5, seed: Some(3), ..SimulationConfig::default() };
        let summaries = crate::batch::run_replicates(&cfg, 3).unwrap();

        write_batch_summary(&summaries, &path).unwrap();

        let decoded: Vec<ReplicateSummary> = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoded, summaries);
    }

    #[test]
    fn batch_summary_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("batch.json");
        assert!(write_batch_summary(&[], &path).is_err());
    }

    #[test]
    fn empty_stats_csv_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_stats_csv(&[], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "timestep,susceptible,infected,recovered");
    }
}
