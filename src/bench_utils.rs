use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::vertex::{CriticalKind, GlobalId, Vertex, VertexTable};

#[derive(Clone, Copy, Debug)]
pub enum TableShape {
    /// Nested pairs along a line; every value is distinct.
    Chain,
    /// Random partners with values drawn from a small grid so exact ties occur.
    Random { essential_every: usize },
}

/// Generates `components` decorated tables of `per_component` vertices each.
/// Global ids are contiguous across components.
pub fn generate_tables(
    shape: TableShape,
    components: usize,
    per_component: usize,
    seed: u64,
) -> Vec<VertexTable> {
    assert!(per_component > 0, "per_component must be positive");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..components)
        .map(|component| {
            let first = (component * per_component) as GlobalId;
            match shape {
                TableShape::Chain => chain_table(first, per_component),
                TableShape::Random { essential_every } => {
                    random_table(&mut rng, first, per_component, essential_every)
                }
            }
        })
        .collect()
}

fn chain_table(first: GlobalId, count: usize) -> VertexTable {
    let step = 1.0 / count as f32;
    let vertices = (0..count)
        .map(|idx| {
            let value = idx as f32 * step;
            let kind = if idx % 2 == 0 {
                CriticalKind::Minimum
            } else {
                CriticalKind::Maximum
            };
            let vertex = Vertex::new(first + idx as GlobalId, value, value * 100.0, kind);
            // pairs (0, n-1), (1, n-2), ...; the middle of an odd chain stays essential
            let mirror = count - 1 - idx;
            if mirror == idx {
                Vertex {
                    kind: CriticalKind::DownFork,
                    ..vertex
                }
            } else {
                vertex.with_partner(mirror)
            }
        })
        .collect();
    table_or_panic(vertices)
}

fn random_table(
    rng: &mut StdRng,
    first: GlobalId,
    count: usize,
    essential_every: usize,
) -> VertexTable {
    let mut vertices: Vec<Vertex> = (0..count)
        .map(|idx| {
            let value = rng.gen_range(0..16) as f32 / 16.0;
            let kind = match rng.gen_range(0..4) {
                0 => CriticalKind::Minimum,
                1 => CriticalKind::Maximum,
                2 => CriticalKind::DownFork,
                _ => CriticalKind::UpFork,
            };
            Vertex::new(first + idx as GlobalId, value, value * 10.0 - 5.0, kind)
        })
        .collect();

    let mut free: Vec<usize> = (0..count)
        .filter(|idx| essential_every == 0 || idx % essential_every != 0)
        .collect();
    while free.len() >= 2 {
        let a = free.swap_remove(rng.gen_range(0..free.len()));
        let b = free.swap_remove(rng.gen_range(0..free.len()));
        vertices[a].partner = Some(b);
        vertices[b].partner = Some(a);
    }
    table_or_panic(vertices)
}

fn table_or_panic(vertices: Vec<Vertex>) -> VertexTable {
    VertexTable::new(vertices).expect("generated tables are symmetric")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::validate_tables;

    #[test]
    fn generated_tables_are_valid_and_deterministic() {
        let a = generate_tables(TableShape::Random { essential_every: 5 }, 3, 40, 7);
        let b = generate_tables(TableShape::Random { essential_every: 5 }, 3, 40, 7);
        assert_eq!(a, b);
        assert!(validate_tables(&a).is_ok());
        assert!(a.iter().all(|t| t.essential().count() >= 8));
    }

    #[test]
    fn odd_chain_leaves_one_essential_down_fork() {
        let tables = generate_tables(TableShape::Chain, 1, 7, 0);
        let essentials: Vec<_> = tables[0].essential().collect();
        assert_eq!(essentials.len(), 1);
        assert_eq!(essentials[0].kind, CriticalKind::DownFork);
    }
}
