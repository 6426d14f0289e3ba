//! Deduplication of interaction records into residue pairs.
use super::structs::InteractionRecord;
use crate::residues::ResidueNode;
use std::collections::HashSet;

/// An undirected aromatic-methionine edge, stripped of all geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResiduePair {
    /// The PHE, TYR or TRP endpoint
    pub aromatic: ResidueNode,
    /// The MET endpoint
    pub methionine: ResidueNode,
}

impl ResiduePair {
    /// Build a pair from its two endpoints.
    pub fn new(aromatic: ResidueNode, methionine: ResidueNode) -> Self {
        Self {
            aromatic,
            methionine,
        }
    }
}

/// Collapse interaction records into unique residue pairs.
///
/// Multiple lone-pair vectors between the same two residues produce a single
/// pair; multiplicity is discarded. An empty input gives an empty set.
pub fn normalize_pairs(records: &[InteractionRecord]) -> HashSet<ResiduePair> {
    records
        .iter()
        .map(|r| ResiduePair::new(r.aromatic.clone(), r.methionine.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residues::ResidueKind;

    fn record(aro: ResidueKind, aro_resi: i64, met_resi: i64, norm: f64) -> InteractionRecord {
        InteractionRecord {
            code: "5xfq".to_string(),
            ec: None,
            aromatic: ResidueNode::new(aro, aro_resi, "A"),
            methionine: ResidueNode::new(ResidueKind::Met, met_resi, "A"),
            norm,
            met_theta: 100.0,
            met_phi: 90.0,
        }
    }

    #[test]
    fn collapse_lone_pair_vectors() {
        let records = vec![
            record(ResidueKind::Phe, 462, 438, 5.42),
            record(ResidueKind::Phe, 462, 438, 5.58),
            record(ResidueKind::Phe, 462, 438, 5.14),
            record(ResidueKind::Phe, 472, 438, 4.24),
            record(ResidueKind::Phe, 472, 438, 4.04),
        ];
        let pairs = normalize_pairs(&records);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&ResiduePair::new(
            ResidueNode::new(ResidueKind::Phe, 462, ""),
            ResidueNode::new(ResidueKind::Met, 438, ""),
        )));
    }

    #[test]
    fn empty_records() {
        assert!(normalize_pairs(&[]).is_empty());
    }
}
