//! Pairing harness: runs a pairing algorithm over every component of an input
//! and returns the decorated tables together with everything derived from them.
//!
//! Each call owns its results. Nothing is kept between calls, so independent
//! inputs can be processed from several threads at once.

use std::time::{Duration, Instant};

use ahash::AHashSet;
use serde::Serialize;

use crate::{
    PairingError,
    compare::{ComparisonConfig, ComparisonReport, compare_diagrams},
    diagram::{Diagram, extract},
    input::{Component, GraphInput},
    loops::count_loops,
    serialize::{ResultArrays, csv_lines},
    vertex::{GlobalId, VertexTable, total_vertices, validate_tables},
};

/// A critical point pairing algorithm, treated as a black box.
///
/// Implementations decorate one connected component: they classify its
/// critical points and assign partners. The returned table must contain the
/// component's global ids only.
pub trait Pairing {
    fn name(&self) -> &str;
    fn pair(&self, component: &Component) -> Result<VertexTable, PairingError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RunTiming {
    /// Validation and component split.
    pub load_ms: f64,
    /// Pairing calls only.
    pub pairing_ms: f64,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Outcome of one pairing run.
#[derive(Clone, Debug)]
pub struct PairingRun {
    algorithm: String,
    tables: Vec<VertexTable>,
    diagram: Diagram,
    arrays: ResultArrays,
    loops: usize,
    timing: RunTiming,
}

impl PairingRun {
    /// Derives the diagram, loop count and arrays from already paired tables.
    pub fn from_tables(
        algorithm: impl Into<String>,
        tables: Vec<VertexTable>,
        timing: RunTiming,
    ) -> Result<Self, PairingError> {
        validate_tables(&tables)?;
        let diagram = extract(&tables);
        let arrays = ResultArrays::from_diagram(&diagram);
        let loops = count_loops(&tables);
        Ok(Self {
            algorithm: algorithm.into(),
            tables,
            diagram,
            arrays,
            loops,
            timing,
        })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn tables(&self) -> &[VertexTable] {
        &self.tables
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn arrays(&self) -> &ResultArrays {
        &self.arrays
    }

    pub fn loop_count(&self) -> usize {
        self.loops
    }

    pub fn vertex_count(&self) -> usize {
        total_vertices(&self.tables)
    }

    pub fn timing(&self) -> RunTiming {
        self.timing
    }

    /// Pairing time in milliseconds, input preparation excluded.
    pub fn elapsed_ms(&self) -> f64 {
        self.timing.pairing_ms
    }

    pub fn birth_values(&self) -> &[f32] {
        &self.arrays.birth_values
    }

    pub fn death_values(&self) -> &[Option<f32>] {
        &self.arrays.death_values
    }

    pub fn real_birth_values(&self) -> &[f32] {
        &self.arrays.real_birth_values
    }

    pub fn real_death_values(&self) -> &[Option<f32>] {
        &self.arrays.real_death_values
    }

    pub fn birth_ids(&self) -> &[GlobalId] {
        &self.arrays.birth_ids
    }

    pub fn death_ids(&self) -> &[Option<GlobalId>] {
        &self.arrays.death_ids
    }

    pub fn csv_lines(&self) -> Vec<String> {
        csv_lines(&self.diagram)
    }
}

fn check_component(component: &Component, table: &VertexTable) -> Result<(), PairingError> {
    if table.len() > component.len() {
        return Err(PairingError::pairing(format!(
            "pairing returned {} vertices for a component of {}",
            table.len(),
            component.len()
        )));
    }
    let ids: AHashSet<GlobalId> = component.vertices.iter().map(|v| v.global_id).collect();
    for vertex in table.iter() {
        if !ids.contains(&vertex.global_id) {
            return Err(PairingError::pairing(format!(
                "pairing returned vertex {} which is not in its component",
                vertex.global_id
            )));
        }
    }
    Ok(())
}

pub fn run_pairing<P: Pairing>(input: &GraphInput, pairing: &P) -> Result<PairingRun, PairingError> {
    let load_start = Instant::now();
    let components = input.components()?;
    let load_ms = millis(load_start.elapsed());
    log::debug!(
        "{}: {} vertices, {} edges in {} connected components, prepared in {load_ms:.3}ms",
        pairing.name(),
        input.vertex_count(),
        input.edge_count(),
        components.len()
    );

    let pairing_start = Instant::now();
    let mut tables = Vec::with_capacity(components.len());
    for component in &components {
        tables.push(pairing.pair(component)?);
    }
    let pairing_ms = millis(pairing_start.elapsed());

    for (component, table) in components.iter().zip(tables.iter()) {
        check_component(component, table)?;
    }
    let run = PairingRun::from_tables(
        pairing.name(),
        tables,
        RunTiming {
            load_ms,
            pairing_ms,
        },
    )?;
    log::debug!(
        "{}: {} loops, computation time {pairing_ms:.3}ms",
        run.algorithm(),
        run.loop_count()
    );
    Ok(run)
}

/// Result of running two algorithms on the same input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationReport {
    pub initial_vertices: usize,
    pub base_algorithm: String,
    pub other_algorithm: String,
    pub base_vertices: usize,
    pub other_vertices: usize,
    pub base_loops: usize,
    pub other_loops: usize,
    pub base_timing: RunTiming,
    pub other_timing: RunTiming,
    pub comparison: ComparisonReport,
}

impl ValidationReport {
    pub fn between(base: &PairingRun, other: &PairingRun, config: &ComparisonConfig) -> Self {
        Self {
            initial_vertices: base.vertex_count(),
            base_algorithm: base.algorithm().to_string(),
            other_algorithm: other.algorithm().to_string(),
            base_vertices: base.vertex_count(),
            other_vertices: other.vertex_count(),
            base_loops: base.loop_count(),
            other_loops: other.loop_count(),
            base_timing: base.timing(),
            other_timing: other.timing(),
            comparison: compare_diagrams(base.diagram(), other.diagram(), config),
        }
    }

    pub fn loops_agree(&self) -> bool {
        self.base_loops == self.other_loops
    }

    pub fn is_consistent(&self) -> bool {
        self.loops_agree() && self.comparison.is_equivalent()
    }
}

pub fn validate_pairings<A: Pairing, B: Pairing>(
    input: &GraphInput,
    base: &A,
    other: &B,
    config: &ComparisonConfig,
) -> Result<ValidationReport, PairingError> {
    let base_run = run_pairing(input, base)?;
    let other_run = run_pairing(input, other)?;
    let mut report = ValidationReport::between(&base_run, &other_run, config);
    report.initial_vertices = input.vertex_count();
    if !report.is_consistent() {
        log::warn!(
            "{} and {} disagree: {} mismatches, loops {} vs {}",
            report.base_algorithm,
            report.other_algorithm,
            report.comparison.mismatches.len(),
            report.base_loops,
            report.other_loops
        );
    }
    Ok(report)
}
