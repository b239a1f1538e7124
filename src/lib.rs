//! Result extraction and cross-algorithm validation for Reeb graph critical
//! point pairings.
//!
//! A pairing algorithm decorates every connected component of a graph with
//! critical point kinds and birth/death partners. This crate turns those
//! decorated [`VertexTable`]s into a canonical persistence [`Diagram`], counts
//! independent loops, checks that two algorithms agree, and renders results
//! as CSV or aligned arrays.

pub mod batch;
pub mod bench_utils;
pub mod compare;
pub mod diagram;
pub mod dump;
pub mod errors;
pub mod harness;
pub mod input;
pub mod loops;
pub mod serialize;
pub mod vertex;

pub use crate::compare::{ComparisonConfig, ComparisonReport, Mismatch, compare_diagrams, equivalent};
pub use crate::diagram::{Death, Diagram, PersistenceRecord, canonical_cmp, extract};
pub use crate::errors::PairingError;
pub use crate::harness::{Pairing, PairingRun, RunTiming, ValidationReport, run_pairing, validate_pairings};
pub use crate::input::{Component, GraphInput, InputVertex};
pub use crate::loops::count_loops;
pub use crate::serialize::{CSV_HEADER, ResultArrays, csv_lines, to_csv};
pub use crate::vertex::{CriticalKind, GlobalId, Vertex, VertexTable, validate_tables};
