use crate::vertex::{CriticalKind, VertexTable};

/// Counts the independent cycles of a decomposition: essential down-forks.
pub fn count_loops(tables: &[VertexTable]) -> usize {
    tables
        .iter()
        .flat_map(VertexTable::iter)
        .filter(|v| v.is_essential() && v.kind == CriticalKind::DownFork)
        .count()
}

#[cfg(test)]
mod tests {
    use super::count_loops;
    use crate::vertex::{CriticalKind, Vertex, VertexTable};

    #[test]
    fn only_essential_down_forks_count() {
        let first = VertexTable::new(vec![
            Vertex::new(0, 0.0, 0.0, CriticalKind::Minimum),
            Vertex::new(1, 0.4, 0.4, CriticalKind::DownFork),
            Vertex::new(2, 0.6, 0.6, CriticalKind::DownFork).with_partner(3),
            Vertex::new(3, 0.9, 0.9, CriticalKind::UpFork).with_partner(2),
        ])
        .unwrap();
        let second = VertexTable::new(vec![Vertex::new(7, 0.5, 0.5, CriticalKind::DownFork)]).unwrap();
        assert_eq!(count_loops(&[first.clone()]), 1);
        assert_eq!(count_loops(&[first, second]), 2);
        assert_eq!(count_loops(&[]), 0);
    }
}
