//! Canonical persistence diagram extraction.
//!
//! [`extract`] flattens the decorated tables of every component into one
//! sorted sequence of birth/death records. Each unordered pair is emitted once,
//! from the endpoint that is smaller under `(value, global_id)`; the id term
//! settles exact value ties.

use std::cmp::Ordering;

use serde::Serialize;

use crate::vertex::{GlobalId, Vertex, VertexTable};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Death {
    pub value: f32,
    pub real_value: f32,
    pub id: GlobalId,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PersistenceRecord {
    pub birth: f32,
    pub real_birth: f32,
    pub birth_id: GlobalId,
    /// `None` for an essential feature.
    pub death: Option<Death>,
}

impl PersistenceRecord {
    pub fn essential(vertex: &Vertex) -> Self {
        Self {
            birth: vertex.value,
            real_birth: vertex.real_value,
            birth_id: vertex.global_id,
            death: None,
        }
    }

    pub fn paired(birth: &Vertex, death: &Vertex) -> Self {
        Self {
            birth: birth.value,
            real_birth: birth.real_value,
            birth_id: birth.global_id,
            death: Some(Death {
                value: death.value,
                real_value: death.real_value,
                id: death.global_id,
            }),
        }
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }

    pub fn death_value(&self) -> Option<f32> {
        self.death.map(|d| d.value)
    }

    pub fn real_death(&self) -> Option<f32> {
        self.death.map(|d| d.real_value)
    }

    pub fn death_id(&self) -> Option<GlobalId> {
        self.death.map(|d| d.id)
    }

    /// Lifetime in the normalized domain, infinite for essential records.
    pub fn persistence(&self) -> f32 {
        match self.death {
            Some(death) => death.value - self.birth,
            None => f32::INFINITY,
        }
    }

    /// The two global ids of a finite pair, smaller id first.
    pub fn pair_key(&self) -> Option<(GlobalId, GlobalId)> {
        self.death.map(|d| {
            if self.birth_id <= d.id {
                (self.birth_id, d.id)
            } else {
                (d.id, self.birth_id)
            }
        })
    }
}

/// Ordering used for every diagram: birth value, then death value with
/// essential deaths last, then birth id, then death id.
pub fn canonical_cmp(a: &PersistenceRecord, b: &PersistenceRecord) -> Ordering {
    a.birth
        .total_cmp(&b.birth)
        .then_with(|| cmp_death(a.death_value(), b.death_value()))
        .then_with(|| a.birth_id.cmp(&b.birth_id))
        .then_with(|| cmp_death_id(a.death_id(), b.death_id()))
}

fn cmp_death(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_death_id(a: Option<GlobalId>, b: Option<GlobalId>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Whether `vertex` is the endpoint that emits its pair.
pub fn emits_pair(vertex: &Vertex, partner: &Vertex) -> bool {
    vertex
        .value
        .total_cmp(&partner.value)
        .then_with(|| vertex.global_id.cmp(&partner.global_id))
        == Ordering::Less
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagram {
    records: Vec<PersistenceRecord>,
}

impl Diagram {
    /// Wraps records after putting them in canonical order.
    pub fn from_records(mut records: Vec<PersistenceRecord>) -> Self {
        records.sort_by(canonical_cmp);
        Self { records }
    }

    pub fn records(&self) -> &[PersistenceRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersistenceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn essential_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_essential()).count()
    }

    pub fn finite_count(&self) -> usize {
        self.records.len() - self.essential_count()
    }
}

pub fn extract(tables: &[VertexTable]) -> Diagram {
    let mut records = Vec::new();
    for table in tables {
        for vertex in table.iter() {
            match table.partner_of(vertex) {
                None => records.push(PersistenceRecord::essential(vertex)),
                Some(partner) => {
                    if emits_pair(vertex, partner) {
                        records.push(PersistenceRecord::paired(vertex, partner));
                    }
                }
            }
        }
    }
    log::debug!(
        "extracted {} records from {} components",
        records.len(),
        tables.len()
    );
    Diagram::from_records(records)
}
