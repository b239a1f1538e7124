//! Decorated vertex tables produced by a pairing algorithm.
//!
//! One [`VertexTable`] holds the critical points of a single connected
//! component. A vertex refers to its partner by index into the same table, so
//! the pairing relation carries no ownership cycle and lookups are O(1).

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::PairingError;

/// Identifier of a critical point, unique across the whole input and stable
/// across algorithm choice.
pub type GlobalId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalKind {
    Minimum,
    Maximum,
    DownFork,
    UpFork,
    Regular,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub global_id: GlobalId,
    /// Normalized scalar used for every comparison.
    pub value: f32,
    /// Original-domain scalar used for reporting.
    pub real_value: f32,
    pub kind: CriticalKind,
    /// Index of the partner inside the owning table, `None` when essential.
    pub partner: Option<usize>,
}

impl Vertex {
    pub fn new(global_id: GlobalId, value: f32, real_value: f32, kind: CriticalKind) -> Self {
        Self {
            global_id,
            value,
            real_value,
            kind,
            partner: None,
        }
    }

    pub fn with_partner(mut self, partner: usize) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn is_essential(&self) -> bool {
        self.partner.is_none()
    }
}

/// Immutable, validated vertex collection for one connected component.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexTable {
    vertices: Vec<Vertex>,
}

impl VertexTable {
    /// Builds a table, rejecting out-of-range partners, self-partners,
    /// asymmetric pairings and duplicate global ids.
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, PairingError> {
        let mut seen = AHashSet::with_capacity(vertices.len());
        for (idx, vertex) in vertices.iter().enumerate() {
            if !seen.insert(vertex.global_id) {
                return Err(PairingError::inconsistent(format!(
                    "duplicate global id {}",
                    vertex.global_id
                )));
            }
            let Some(partner) = vertex.partner else {
                continue;
            };
            if partner == idx {
                return Err(PairingError::inconsistent(format!(
                    "vertex {} is paired with itself",
                    vertex.global_id
                )));
            }
            let Some(other) = vertices.get(partner) else {
                return Err(PairingError::inconsistent(format!(
                    "vertex {} refers to partner index {partner} outside table of {}",
                    vertex.global_id,
                    vertices.len()
                )));
            };
            if other.partner != Some(idx) {
                return Err(PairingError::inconsistent(format!(
                    "pairing {} -> {} is not symmetric",
                    vertex.global_id, other.global_id
                )));
            }
        }
        Ok(Self { vertices })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Vertex> {
        self.vertices.get(idx)
    }

    pub fn partner_of(&self, vertex: &Vertex) -> Option<&Vertex> {
        vertex.partner.and_then(|idx| self.vertices.get(idx))
    }

    pub fn essential(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter(|v| v.is_essential())
    }
}

/// Checks that global ids are unique across every table of one input.
pub fn validate_tables(tables: &[VertexTable]) -> Result<(), PairingError> {
    let total = tables.iter().map(VertexTable::len).sum();
    let mut seen = AHashSet::with_capacity(total);
    for (component, table) in tables.iter().enumerate() {
        for vertex in table.iter() {
            if !seen.insert(vertex.global_id) {
                return Err(PairingError::inconsistent(format!(
                    "global id {} appears again in component {component}",
                    vertex.global_id
                )));
            }
        }
    }
    Ok(())
}

pub fn total_vertices(tables: &[VertexTable]) -> usize {
    tables.iter().map(VertexTable::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_table() -> VertexTable {
        VertexTable::new(vec![
            Vertex::new(10, 0.0, 5.0, CriticalKind::Minimum).with_partner(1),
            Vertex::new(11, 1.0, 9.0, CriticalKind::Maximum).with_partner(0),
            Vertex::new(12, 0.5, 7.0, CriticalKind::DownFork),
        ])
        .unwrap()
    }

    #[test]
    fn partner_lookup_is_symmetric() {
        let table = pair_table();
        for vertex in table.iter() {
            if let Some(partner) = table.partner_of(vertex) {
                let back = table.partner_of(partner).unwrap();
                assert_eq!(back.global_id, vertex.global_id);
            }
        }
        assert_eq!(table.essential().count(), 1);
    }

    #[test]
    fn asymmetric_partner_rejected() {
        let err = VertexTable::new(vec![
            Vertex::new(0, 0.0, 0.0, CriticalKind::Minimum).with_partner(1),
            Vertex::new(1, 1.0, 1.0, CriticalKind::Maximum),
        ])
        .unwrap_err();
        assert!(matches!(err, PairingError::InconsistentTable(_)));
    }

    #[test]
    fn self_partner_and_out_of_range_rejected() {
        assert!(
            VertexTable::new(vec![
                Vertex::new(0, 0.0, 0.0, CriticalKind::Minimum).with_partner(0)
            ])
            .is_err()
        );
        assert!(
            VertexTable::new(vec![
                Vertex::new(0, 0.0, 0.0, CriticalKind::Minimum).with_partner(4)
            ])
            .is_err()
        );
    }

    #[test]
    fn duplicate_ids_across_tables_rejected() {
        let a = pair_table();
        let b = VertexTable::new(vec![Vertex::new(12, 0.2, 0.2, CriticalKind::Minimum)]).unwrap();
        let err = validate_tables(&[a.clone(), b]).unwrap_err();
        assert!(err.to_string().contains("12"));
        assert!(validate_tables(&[a]).is_ok());
    }
}
