//! Batch processing of decorated dumps for the command-line tool.
//!
//! Every input yields an explicit outcome; a failing input never stops the
//! batch, and the caller decides the aggregate exit status.

use std::{path::Path, time::Instant};

use serde_json::{Value, json};

use crate::{
    PairingError,
    compare::ComparisonConfig,
    dump::load_tables_from_path,
    harness::{PairingRun, RunTiming, ValidationReport},
    serialize::{ResultArrays, render_intervals, to_csv},
};

const DUMP_SOURCE: &str = "dump";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Intervals,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "intervals" => Ok(OutputFormat::Intervals),
            other => Err(format!("unknown format {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CommandLineConfig {
    pub inputs: Vec<String>,
    pub format: OutputFormat,
    /// Exit successfully even when some inputs failed.
    pub legacy_exit: bool,
    pub verbose: bool,
    pub compare: Option<(String, String)>,
    pub comparison: ComparisonConfig,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut config = CommandLineConfig::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--format" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| "--format requires a value".to_string())?;
                    config.format = OutputFormat::parse(value)?;
                }
                "--compare" => {
                    let base = iter
                        .next()
                        .ok_or_else(|| "--compare requires two dumps".to_string())?;
                    let other = iter
                        .next()
                        .ok_or_else(|| "--compare requires two dumps".to_string())?;
                    config.compare = Some((base.to_string(), other.to_string()));
                }
                "--legacy-compare" => config.comparison = ComparisonConfig::legacy(),
                "--legacy-exit" => config.legacy_exit = true,
                "--verbose" | "-v" => config.verbose = true,
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                input => config.inputs.push(input.to_string()),
            }
        }
        if config.compare.is_some() && !config.inputs.is_empty() {
            return Err("--compare does not take additional inputs".to_string());
        }
        Ok(config)
    }

    pub fn help() -> &'static str {
        "Usage: reebpair [--format csv|json|intervals] [--legacy-exit] [--verbose] <dump1> ... <dumpN>\n       reebpair [--legacy-compare] --compare <dumpA> <dumpB>\n"
    }

    pub fn banner() -> &'static str {
        "\n   ###################################################################################\n   Propagate and pair: A single-pass approach to critical point pairing in reeb graphs\n   International Symposium on Visual Computing, Springer, Cham, 2019\n   Junyi Tu, Mustafa Hajij, and Paul Rosen\n\n   Usage:\n      > reebpair <file1> <file2> ... <fileN>\n"
    }
}

pub fn load_run<P: AsRef<Path>>(path: P) -> Result<PairingRun, PairingError> {
    let start = Instant::now();
    let tables = load_tables_from_path(path.as_ref())?;
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;
    PairingRun::from_tables(
        DUMP_SOURCE,
        tables,
        RunTiming {
            load_ms,
            pairing_ms: 0.0,
        },
    )
}

pub fn render(run: &PairingRun, format: OutputFormat) -> Result<String, PairingError> {
    match format {
        OutputFormat::Csv => Ok(to_csv(run.diagram())),
        OutputFormat::Intervals => Ok(render_intervals(run.diagram())),
        OutputFormat::Json => {
            let payload = json!({
                "loops": run.loop_count(),
                "vertices": run.vertex_count(),
                "components": run.tables().len(),
                "load_ms": run.timing().load_ms,
                "results": results_value(run.arrays())?,
            });
            let mut line = serde_json::to_string(&payload)
                .map_err(|e| PairingError::serialization(e.to_string()))?;
            line.push('\n');
            Ok(line)
        }
    }
}

fn results_value(arrays: &ResultArrays) -> Result<Value, PairingError> {
    serde_json::to_value(arrays).map_err(|e| PairingError::serialization(e.to_string()))
}

#[derive(Debug)]
pub struct InputReport {
    pub loops: usize,
    pub vertices: usize,
    pub components: usize,
    pub timing: RunTiming,
    pub output: String,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub input: String,
    pub result: Result<InputReport, PairingError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub fn process_input(input: &str, format: OutputFormat) -> BatchOutcome {
    let result = load_run(input).and_then(|run| {
        let output = render(&run, format)?;
        Ok(InputReport {
            loops: run.loop_count(),
            vertices: run.vertex_count(),
            components: run.tables().len(),
            timing: run.timing(),
            output,
        })
    });
    if let Err(err) = &result {
        log::warn!("{input}: {err}");
    }
    BatchOutcome {
        input: input.to_string(),
        result,
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Process exit status for the batch.
    pub fn exit_code(&self, legacy_exit: bool) -> i32 {
        if legacy_exit || !self.has_failures() { 0 } else { 1 }
    }
}

/// Processes every input in order, handing each outcome to `on_outcome` as
/// soon as it is ready. A failed input never stops the batch.
pub fn run_batch<F>(inputs: &[String], format: OutputFormat, mut on_outcome: F) -> BatchSummary
where
    F: FnMut(&BatchOutcome),
{
    let mut summary = BatchSummary::default();
    for input in inputs {
        let outcome = process_input(input, format);
        on_outcome(&outcome);
        summary.outcomes.push(outcome);
    }
    summary
}

pub fn compare_dumps<P: AsRef<Path>, Q: AsRef<Path>>(
    base: P,
    other: Q,
    config: &ComparisonConfig,
) -> Result<ValidationReport, PairingError> {
    let base_run = load_run(base)?;
    let other_run = load_run(other)?;
    Ok(ValidationReport::between(&base_run, &other_run, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CommandLineConfig, String> {
        let mut full = vec!["reebpair"];
        full.extend_from_slice(list);
        CommandLineConfig::from_args(&full)
    }

    #[test]
    fn parses_inputs_and_flags() {
        let cfg = args(&["a.jsonl", "--format", "json", "b.jsonl", "--legacy-exit"]).unwrap();
        assert_eq!(cfg.inputs, vec!["a.jsonl", "b.jsonl"]);
        assert_eq!(cfg.format, OutputFormat::Json);
        assert!(cfg.legacy_exit);
        assert_eq!(cfg.comparison, ComparisonConfig::strict());
    }

    #[test]
    fn rejects_unknown_flag_and_bad_format() {
        assert!(args(&["--nope"]).is_err());
        assert!(args(&["--format", "xml"]).is_err());
        assert!(args(&["--compare", "only-one"]).is_err());
    }

    #[test]
    fn compare_mode_takes_exactly_two_dumps() {
        let cfg = args(&["--legacy-compare", "--compare", "a", "b"]).unwrap();
        assert_eq!(cfg.compare, Some(("a".to_string(), "b".to_string())));
        assert_eq!(cfg.comparison, ComparisonConfig::legacy());
        assert!(args(&["--compare", "a", "b", "c"]).is_err());
    }

    #[test]
    fn missing_input_is_an_outcome_not_a_panic() {
        let inputs = vec!["/nonexistent/dump.jsonl".to_string(), "/nonexistent/other.jsonl".to_string()];
        let mut seen = Vec::new();
        let summary = run_batch(&inputs, OutputFormat::Csv, |outcome| seen.push(outcome.input.clone()));
        assert_eq!(seen, inputs);
        assert_eq!(summary.failures().count(), 2);
        assert!(summary.has_failures());
        assert_eq!(summary.exit_code(false), 1);
        assert_eq!(summary.exit_code(true), 0);
    }
}
