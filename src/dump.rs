//! JSON-lines dump of decorated vertex tables.
//!
//! One record per line, tagged by `type`. Partners are written as global ids
//! and resolved back to table indices on load.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    PairingError,
    vertex::{CriticalKind, GlobalId, Vertex, VertexTable, validate_tables},
};

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DumpRecord {
    Vertex {
        component: usize,
        global_id: GlobalId,
        value: f32,
        real_value: f32,
        kind: CriticalKind,
        partner: Option<GlobalId>,
    },
}

struct PendingVertex {
    global_id: GlobalId,
    value: f32,
    real_value: f32,
    kind: CriticalKind,
    partner: Option<GlobalId>,
}

pub fn load_tables_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<VertexTable>, PairingError> {
    let file = File::open(path.as_ref())
        .map_err(|e| PairingError::load(format!("{}: {e}", path.as_ref().display())))?;
    load_tables_from_reader(BufReader::new(file))
}

pub fn load_tables_from_reader<R: BufRead>(reader: R) -> Result<Vec<VertexTable>, PairingError> {
    let mut components: BTreeMap<usize, Vec<PendingVertex>> = BTreeMap::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PairingError::load(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DumpRecord = serde_json::from_str(&line)
            .map_err(|e| PairingError::load(format!("line {}: {e}", line_no + 1)))?;
        match record {
            DumpRecord::Vertex {
                component,
                global_id,
                value,
                real_value,
                kind,
                partner,
            } => components.entry(component).or_default().push(PendingVertex {
                global_id,
                value,
                real_value,
                kind,
                partner,
            }),
        }
    }

    let mut tables = Vec::with_capacity(components.len());
    for (component, pending) in components {
        tables.push(resolve_component(component, pending)?);
    }
    validate_tables(&tables)?;
    log::debug!("loaded {} components from dump", tables.len());
    Ok(tables)
}

fn resolve_component(
    component: usize,
    pending: Vec<PendingVertex>,
) -> Result<VertexTable, PairingError> {
    let slots: AHashMap<GlobalId, usize> = pending
        .iter()
        .enumerate()
        .map(|(idx, v)| (v.global_id, idx))
        .collect();
    let mut vertices = Vec::with_capacity(pending.len());
    for vertex in pending {
        let partner = match vertex.partner {
            Some(id) => Some(slots.get(&id).copied().ok_or_else(|| {
                PairingError::load(format!(
                    "vertex {} in component {component} is paired with {id}, which is not in that component",
                    vertex.global_id
                ))
            })?),
            None => None,
        };
        vertices.push(Vertex {
            global_id: vertex.global_id,
            value: vertex.value,
            real_value: vertex.real_value,
            kind: vertex.kind,
            partner,
        });
    }
    VertexTable::new(vertices)
}

pub fn dump_tables_to_path<P: AsRef<Path>>(
    tables: &[VertexTable],
    path: P,
) -> Result<(), PairingError> {
    let file = File::create(path.as_ref())
        .map_err(|e| PairingError::serialization(format!("{}: {e}", path.as_ref().display())))?;
    let mut writer = BufWriter::new(file);
    dump_tables_to_writer(tables, &mut writer)?;
    writer
        .flush()
        .map_err(|e| PairingError::serialization(e.to_string()))
}

pub fn dump_tables_to_writer<W: Write>(
    tables: &[VertexTable],
    mut writer: W,
) -> Result<(), PairingError> {
    for (component, table) in tables.iter().enumerate() {
        for vertex in table.iter() {
            write_record(
                &mut writer,
                &DumpRecord::Vertex {
                    component,
                    global_id: vertex.global_id,
                    value: vertex.value,
                    real_value: vertex.real_value,
                    kind: vertex.kind,
                    partner: table.partner_of(vertex).map(|p| p.global_id),
                },
            )?;
        }
    }
    Ok(())
}

fn write_record<W: Write>(writer: &mut W, record: &DumpRecord) -> Result<(), PairingError> {
    serde_json::to_writer(&mut *writer, record)
        .map_err(|e| PairingError::serialization(e.to_string()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| PairingError::serialization(e.to_string()))
}
