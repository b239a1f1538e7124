//! Cross-algorithm equivalence of persistence diagrams.
//!
//! Two pairing algorithms run on the same input must join the same global ids.
//! Values are algorithm-internal and never compared here. Every mismatch is
//! collected; the scan never stops at the first one.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::{
    diagram::{Diagram, PersistenceRecord},
    vertex::GlobalId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonConfig {
    /// Require every essential id of the base diagram to be essential in the other.
    pub verify_essentials: bool,
    /// Also report pairs and essentials present only in the other diagram.
    pub bidirectional: bool,
}

impl ComparisonConfig {
    pub fn strict() -> Self {
        Self {
            verify_essentials: true,
            bidirectional: true,
        }
    }

    /// Checks finite pairs of the base diagram only; essentials are listed but
    /// taken on trust.
    pub fn legacy() -> Self {
        Self {
            verify_essentials: false,
            bidirectional: false,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self::strict()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Pair of the base diagram with no counterpart in the other.
    MissingPair {
        birth_id: GlobalId,
        death_id: GlobalId,
        /// Partner of `birth_id` in the other diagram, `None` if essential or absent.
        found_partner: Option<GlobalId>,
    },
    UnexpectedPair {
        birth_id: GlobalId,
        death_id: GlobalId,
    },
    EssentialMissing {
        id: GlobalId,
    },
    UnexpectedEssential {
        id: GlobalId,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MissingPair {
                birth_id,
                death_id,
                found_partner,
            } => match found_partner {
                Some(found) => write!(
                    f,
                    "error == {birth_id} | {death_id} (other pairs {birth_id} with {found})"
                ),
                None => write!(f, "error == {birth_id} | {death_id} (no pair in other)"),
            },
            Mismatch::UnexpectedPair { birth_id, death_id } => {
                write!(f, "error == {birth_id} | {death_id} (only in other)")
            }
            Mismatch::EssentialMissing { id } => {
                write!(f, "error == {id} | NULL (not essential in other)")
            }
            Mismatch::UnexpectedEssential { id } => {
                write!(f, "error == {id} | NULL (only essential in other)")
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub compared_pairs: usize,
    /// Essential ids of the base diagram.
    pub unpaired: Vec<GlobalId>,
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonReport {
    pub fn is_equivalent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Partner lookup by global id over every record of a diagram.
struct PartnerIndex {
    partners: AHashMap<GlobalId, GlobalId>,
    essential: AHashSet<GlobalId>,
}

impl PartnerIndex {
    fn build(diagram: &Diagram) -> Self {
        let mut partners = AHashMap::with_capacity(diagram.len() * 2);
        let mut essential = AHashSet::new();
        for record in diagram.iter() {
            match record.death_id() {
                Some(death_id) => {
                    partners.insert(record.birth_id, death_id);
                    partners.insert(death_id, record.birth_id);
                }
                None => {
                    essential.insert(record.birth_id);
                }
            }
        }
        Self {
            partners,
            essential,
        }
    }

    fn partner(&self, id: GlobalId) -> Option<GlobalId> {
        self.partners.get(&id).copied()
    }

    fn has_pair(&self, record: &PersistenceRecord) -> bool {
        match record.death_id() {
            Some(death_id) => self.partner(record.birth_id) == Some(death_id),
            None => false,
        }
    }
}

pub fn compare_diagrams(
    base: &Diagram,
    other: &Diagram,
    config: &ComparisonConfig,
) -> ComparisonReport {
    let other_index = PartnerIndex::build(other);
    let mut report = ComparisonReport::default();

    for record in base.iter() {
        let Some(death_id) = record.death_id() else {
            report.unpaired.push(record.birth_id);
            if config.verify_essentials && !other_index.essential.contains(&record.birth_id) {
                report.mismatches.push(Mismatch::EssentialMissing {
                    id: record.birth_id,
                });
            }
            continue;
        };
        report.compared_pairs += 1;
        if !other_index.has_pair(record) {
            report.mismatches.push(Mismatch::MissingPair {
                birth_id: record.birth_id,
                death_id,
                found_partner: other_index.partner(record.birth_id),
            });
        }
    }

    if config.bidirectional {
        let base_index = PartnerIndex::build(base);
        for record in other.iter() {
            match record.death_id() {
                Some(death_id) => {
                    if !base_index.has_pair(record) {
                        report.mismatches.push(Mismatch::UnexpectedPair {
                            birth_id: record.birth_id,
                            death_id,
                        });
                    }
                }
                None => {
                    if config.verify_essentials && !base_index.essential.contains(&record.birth_id)
                    {
                        report.mismatches.push(Mismatch::UnexpectedEssential {
                            id: record.birth_id,
                        });
                    }
                }
            }
        }
    }

    for mismatch in &report.mismatches {
        log::warn!("{mismatch}");
    }
    report
}

/// Equivalence under the strict configuration.
pub fn equivalent(base: &Diagram, other: &Diagram) -> bool {
    compare_diagrams(base, other, &ComparisonConfig::strict()).is_equivalent()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagram::extract,
        vertex::{CriticalKind, Vertex, VertexTable},
    };

    fn diagram(values: &[(GlobalId, f32, Option<usize>)]) -> Diagram {
        let vertices = values
            .iter()
            .map(|&(id, value, partner)| {
                let vertex = Vertex::new(id, value, value, CriticalKind::Regular);
                match partner {
                    Some(p) => vertex.with_partner(p),
                    None => vertex,
                }
            })
            .collect();
        extract(&[VertexTable::new(vertices).unwrap()])
    }

    #[test]
    fn same_ids_different_values_are_equivalent() {
        let a = diagram(&[(0, 0.1, Some(1)), (1, 0.5, Some(0)), (2, 0.0, None)]);
        let b = diagram(&[(1, 0.2, Some(1)), (0, 0.7, Some(0)), (2, 0.3, None)]);
        assert!(equivalent(&a, &b));
        let report = compare_diagrams(&a, &b, &ComparisonConfig::default());
        assert_eq!(report.compared_pairs, 1);
        assert_eq!(report.unpaired, vec![2]);
    }

    #[test]
    fn every_mismatch_is_reported() {
        let a = diagram(&[
            (0, 0.1, Some(1)),
            (1, 0.5, Some(0)),
            (2, 0.2, Some(3)),
            (3, 0.9, Some(2)),
            (4, 0.0, None),
        ]);
        let b = diagram(&[
            (0, 0.1, Some(3)),
            (1, 0.5, Some(2)),
            (2, 0.2, Some(1)),
            (3, 0.9, Some(0)),
            (4, 0.0, None),
        ]);
        let report = compare_diagrams(&a, &b, &ComparisonConfig::legacy());
        assert!(!report.is_equivalent());
        assert_eq!(report.mismatches.len(), 2);
        assert!(matches!(
            report.mismatches[0],
            Mismatch::MissingPair {
                birth_id: 0,
                death_id: 1,
                found_partner: Some(3)
            }
        ));
    }

    #[test]
    fn legacy_mode_trusts_essentials() {
        let a = diagram(&[(0, 0.0, None), (1, 0.4, None)]);
        let b = diagram(&[(0, 0.0, None), (1, 0.4, Some(2)), (2, 0.8, Some(1))]);
        assert!(compare_diagrams(&a, &b, &ComparisonConfig::legacy()).is_equivalent());

        let strict = compare_diagrams(&a, &b, &ComparisonConfig::strict());
        assert!(strict.mismatches.contains(&Mismatch::EssentialMissing { id: 1 }));
        assert!(
            strict
                .mismatches
                .contains(&Mismatch::UnexpectedPair {
                    birth_id: 1,
                    death_id: 2
                })
        );
    }

    #[test]
    fn extra_essential_in_other_only_caught_bidirectionally() {
        let a = diagram(&[(0, 0.0, None)]);
        let b = diagram(&[(0, 0.0, None), (5, 0.5, None)]);
        let one_way = ComparisonConfig {
            verify_essentials: true,
            bidirectional: false,
        };
        assert!(compare_diagrams(&a, &b, &one_way).is_equivalent());
        assert!(!equivalent(&a, &b));
    }

    #[test]
    fn mismatch_display_matches_diagnostic_format() {
        let text = Mismatch::EssentialMissing { id: 7 }.to_string();
        assert!(text.starts_with("error == 7 | NULL"));
    }
}
