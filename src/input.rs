//! Graph description accepted by the programmatic entry point.
//!
//! The graph arrives as four aligned sequences. It is validated up front and
//! split into connected components, each of which is handed to a pairing
//! algorithm independently.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{PairingError, vertex::GlobalId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    pub vertex_ids: Vec<GlobalId>,
    pub vertex_weights: Vec<f32>,
    pub edge_origins: Vec<GlobalId>,
    pub edge_destinations: Vec<GlobalId>,
}

/// A vertex of one component before pairing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputVertex {
    pub global_id: GlobalId,
    pub value: f32,
    pub real_value: f32,
}

/// A connected component with edges expressed as local vertex indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub vertices: Vec<InputVertex>,
    pub edges: Vec<(usize, usize)>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl GraphInput {
    pub fn new(
        vertex_ids: Vec<GlobalId>,
        vertex_weights: Vec<f32>,
        edge_origins: Vec<GlobalId>,
        edge_destinations: Vec<GlobalId>,
    ) -> Self {
        Self {
            vertex_ids,
            vertex_weights,
            edge_origins,
            edge_destinations,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_origins.len()
    }

    /// Fails fast on misaligned sequences, duplicate ids, non-finite weights
    /// and edges naming unknown vertices.
    pub fn validate(&self) -> Result<(), PairingError> {
        self.resolve_edges().map(|_| ())
    }

    /// Edges as pairs of positions into `vertex_ids`.
    fn resolve_edges(&self) -> Result<Vec<(usize, usize)>, PairingError> {
        if self.vertex_ids.len() != self.vertex_weights.len() {
            return Err(PairingError::invalid_input(format!(
                "vertex_ids has {} entries but vertex_weights has {}",
                self.vertex_ids.len(),
                self.vertex_weights.len()
            )));
        }
        if self.edge_origins.len() != self.edge_destinations.len() {
            return Err(PairingError::invalid_input(format!(
                "edge_origins has {} entries but edge_destinations has {}",
                self.edge_origins.len(),
                self.edge_destinations.len()
            )));
        }
        let mut index = AHashMap::with_capacity(self.vertex_ids.len());
        for (pos, (&id, &weight)) in self
            .vertex_ids
            .iter()
            .zip(self.vertex_weights.iter())
            .enumerate()
        {
            if !weight.is_finite() {
                return Err(PairingError::invalid_input(format!(
                    "vertex {id} has non-finite weight {weight}"
                )));
            }
            if index.insert(id, pos).is_some() {
                return Err(PairingError::invalid_input(format!(
                    "vertex id {id} is listed more than once"
                )));
            }
        }
        let lookup = |edge: usize, endpoint: &GlobalId| {
            index.get(endpoint).copied().ok_or_else(|| {
                PairingError::invalid_input(format!(
                    "edge {edge} refers to unknown vertex {endpoint}"
                ))
            })
        };
        self.edge_origins
            .iter()
            .zip(self.edge_destinations.iter())
            .enumerate()
            .map(|(edge, (from, to))| -> Result<(usize, usize), PairingError> {
                Ok((lookup(edge, from)?, lookup(edge, to)?))
            })
            .collect()
    }

    /// Normalizes weights to `[0, 1]` over the whole input and splits the graph
    /// into connected components. Components are ordered by their first vertex
    /// in input order, and vertices keep input order inside a component.
    pub fn components(&self) -> Result<Vec<Component>, PairingError> {
        let edges = self.resolve_edges()?;
        let n = self.vertex_ids.len();
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in &edges {
            adjacency[a].push(b);
            if a != b {
                adjacency[b].push(a);
            }
        }

        let normalized = normalize(&self.vertex_weights);
        let mut component_of = vec![usize::MAX; n];
        let mut members: Vec<Vec<usize>> = Vec::new();
        for start in 0..n {
            if component_of[start] != usize::MAX {
                continue;
            }
            let label = members.len();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            component_of[start] = label;
            let mut group = Vec::new();
            while let Some(node) = queue.pop_front() {
                group.push(node);
                for &next in &adjacency[node] {
                    if component_of[next] == usize::MAX {
                        component_of[next] = label;
                        queue.push_back(next);
                    }
                }
            }
            group.sort_unstable();
            members.push(group);
        }

        let mut local = vec![0usize; n];
        let mut components: Vec<Component> = members
            .iter()
            .map(|group| {
                let vertices = group
                    .iter()
                    .enumerate()
                    .map(|(slot, &pos)| {
                        local[pos] = slot;
                        InputVertex {
                            global_id: self.vertex_ids[pos],
                            value: normalized[pos],
                            real_value: self.vertex_weights[pos],
                        }
                    })
                    .collect();
                Component {
                    vertices,
                    edges: Vec::new(),
                }
            })
            .collect();
        for &(a, b) in &edges {
            components[component_of[a]].edges.push((local[a], local[b]));
        }
        Ok(components)
    }
}

/// Maps weights onto `[0, 1]`. The range is taken in `f64` so that finite
/// weights spanning most of the `f32` range still normalize.
fn normalize(weights: &[f32]) -> Vec<f32> {
    let (min, max) = weights
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &w| {
            (lo.min(f64::from(w)), hi.max(f64::from(w)))
        });
    let range = max - min;
    if range <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights
        .iter()
        .map(|&w| ((f64::from(w) - min) / range) as f32)
        .collect()
}
