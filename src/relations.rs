//! Set relationships between aromatic chains and bridges.
use crate::bridges::Bridge;
use crate::chains::ChainComponent;
use crate::error::BridgeError;
use crate::residues::ResidueNode;
use core::fmt;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// How a chain's members relate to a bridge's aromatic members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relationship {
    /// Not related: no shared residue
    NotRelated,
    /// Every chain member belongs to the bridge
    ChainInBridge,
    /// Every bridge aromatic belongs to the chain
    BridgeInChain,
    /// Some, but not all, residues are shared
    Intersecting,
}

impl Relationship {
    /// Short tag used in reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NotRelated => "NR",
            Self::ChainInBridge => "2R",
            Self::BridgeInChain => "DS",
            Self::Intersecting => "IS",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Classify a chain against a bridge's aromatic set. The first matching rule wins:
///
/// 1. NR if `chain ∩ bridge = ∅`
/// 2. 2R if `chain − bridge = ∅`
/// 3. DS if `chain ∩ bridge = bridge`
/// 4. IS if the intersection is non-empty
///
/// A pair matching none of them is reported as [`BridgeError::AmbiguousClassification`].
pub fn classify(
    chain: &BTreeSet<ResidueNode>,
    bridge: &BTreeSet<ResidueNode>,
) -> Result<Relationship, BridgeError> {
    let shared: BTreeSet<&ResidueNode> = chain.intersection(bridge).collect();

    if shared.is_empty() {
        Ok(Relationship::NotRelated)
    } else if chain.difference(bridge).next().is_none() {
        Ok(Relationship::ChainInBridge)
    } else if shared.len() == bridge.len() {
        Ok(Relationship::BridgeInChain)
    } else if shared.iter().any(|r| bridge.contains(*r)) {
        Ok(Relationship::Intersecting)
    } else {
        Err(BridgeError::AmbiguousClassification {
            chain: chain.iter().map(|r| r.label()).collect(),
            bridge: bridge.iter().map(|r| r.label()).collect(),
        })
    }
}

/// The outcome of comparing one chain against one bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    /// Structure entry identifier
    pub code: String,
    /// Classification of the pair
    pub relationship: Relationship,
    /// Chain members, kept for auditing
    pub chain: BTreeSet<ResidueNode>,
    /// Bridge aromatics (methionine excluded), kept for auditing
    pub bridge: BTreeSet<ResidueNode>,
}

/// Compare every chain against every bridge of one structure entry.
pub fn compare_networks(
    code: &str,
    chains: &[ChainComponent],
    bridges: &[Bridge],
) -> Result<Vec<RelationshipRecord>, BridgeError> {
    let bridge_sets: Vec<BTreeSet<ResidueNode>> = bridges
        .iter()
        .map(|b| b.aromatics.iter().cloned().collect())
        .collect();

    let mut records = Vec::with_capacity(chains.len() * bridges.len());
    for chain in chains {
        for bridge in &bridge_sets {
            records.push(RelationshipRecord {
                code: code.to_string(),
                relationship: classify(&chain.members, bridge)?,
                chain: chain.members.clone(),
                bridge: bridge.clone(),
            });
        }
    }
    Ok(records)
}

/// Tally of relationship tags over many entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSummary {
    /// Number of records per relationship
    pub counts: BTreeMap<Relationship, u64>,
    /// Entries that had at least one chain and one bridge
    pub entries_compared: u64,
}

impl RelationshipSummary {
    /// Add the records produced for one entry.
    pub fn add_entry(&mut self, records: &[RelationshipRecord]) {
        if records.is_empty() {
            return;
        }
        self.entries_compared += 1;
        for r in records {
            *self.counts.entry(r.relationship).or_insert(0) += 1;
        }
    }

    /// Number of records with the given relationship.
    pub fn get(&self, relationship: Relationship) -> u64 {
        self.counts.get(&relationship).copied().unwrap_or(0)
    }

    /// Number of records over all relationships.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Combine two tallies.
    pub fn merged(mut self, other: RelationshipSummary) -> Self {
        self.entries_compared += other.entries_compared;
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
        self
    }
}

/// Convert relationship records into a Polars `DataFrame`.
///
/// Columns: `code`, `relationship`, `chain`, `bridge`, with members joined by commas.
pub fn relationships_to_df(records: &[RelationshipRecord]) -> PolarsResult<DataFrame> {
    let join = |set: &BTreeSet<ResidueNode>| {
        set.iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(",")
    };
    df!(
        "code" => records.iter().map(|r| r.code.clone()).collect::<Vec<String>>(),
        "relationship" => records.iter().map(|r| r.relationship.tag()).collect::<Vec<&str>>(),
        "chain" => records.iter().map(|r| join(&r.chain)).collect::<Vec<String>>(),
        "bridge" => records.iter().map(|r| join(&r.bridge)).collect::<Vec<String>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[&str]) -> BTreeSet<ResidueNode> {
        labels.iter().map(|l| l.parse().unwrap()).collect()
    }

    #[test]
    fn equal_sets_classify_as_chain_in_bridge() {
        let r = classify(&set(&["TYR10", "TYR20"]), &set(&["TYR10", "TYR20"])).unwrap();
        assert_eq!(r, Relationship::ChainInBridge);
        assert_eq!(r.tag(), "2R");
    }

    #[test]
    fn each_rule() {
        assert_eq!(
            classify(&set(&["TYR1", "TRP2"]), &set(&["PHE5", "TYR6"])).unwrap(),
            Relationship::NotRelated
        );
        // Chain inside the bridge
        assert_eq!(
            classify(&set(&["TYR1"]), &set(&["TYR1", "PHE5"])).unwrap(),
            Relationship::ChainInBridge
        );
        // Bridge inside the chain
        assert_eq!(
            classify(&set(&["TYR1", "TYR2", "TRP3"]), &set(&["TYR1", "TYR2"])).unwrap(),
            Relationship::BridgeInChain
        );
        assert_eq!(
            classify(&set(&["TYR1", "TRP3"]), &set(&["TYR1", "PHE9"])).unwrap(),
            Relationship::Intersecting
        );
    }

    #[test]
    fn classification_is_total() {
        // Every pair of non-empty subsets over a small universe is classified
        let universe = ["TYR1", "TYR2", "TRP3", "PHE4"];
        let subsets: Vec<BTreeSet<ResidueNode>> = (1u32..16)
            .map(|mask| {
                universe
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, l)| l.parse().unwrap())
                    .collect()
            })
            .collect();
        for chain in &subsets {
            for bridge in &subsets {
                let r = classify(chain, bridge).unwrap();
                let shared = chain.intersection(bridge).count();
                let expected = if shared == 0 {
                    Relationship::NotRelated
                } else if chain.is_subset(bridge) {
                    Relationship::ChainInBridge
                } else if bridge.is_subset(chain) {
                    Relationship::BridgeInChain
                } else {
                    Relationship::Intersecting
                };
                assert_eq!(r, expected, "{chain:?} vs {bridge:?}");
            }
        }
    }

    #[test]
    fn compare_all_pairs() {
        let chains = vec![
            ChainComponent {
                members: set(&["TYR10", "TYR20"]),
            },
            ChainComponent {
                members: set(&["TRP99", "TYR98"]),
            },
        ];
        let bridges = vec![Bridge {
            code: "1abc".to_string(),
            ec: None,
            methionine: "MET5".parse().unwrap(),
            aromatics: vec!["TYR10".parse().unwrap(), "TYR20".parse().unwrap()],
        }];
        let records = compare_networks("1abc", &chains, &bridges).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].relationship, Relationship::ChainInBridge);
        assert_eq!(records[1].relationship, Relationship::NotRelated);

        let mut summary = RelationshipSummary::default();
        summary.add_entry(&records);
        summary.add_entry(&[]);
        assert_eq!(summary.entries_compared, 1);
        assert_eq!(summary.get(Relationship::ChainInBridge), 1);
        assert_eq!(summary.total(), 2);

        let df = relationships_to_df(&records).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn nothing_to_compare() {
        assert!(compare_networks("1abc", &[], &[]).unwrap().is_empty());
    }
}
