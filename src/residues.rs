//! Residue identities used as graph nodes.
use crate::error::BridgeError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Residue types that can take part in a Met-aromatic bridge.
///
/// The declaration order is the canonical order used when labelling bridges,
/// i.e. PHE < TYR < TRP < MET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResidueKind {
    /// Phenylalanine
    Phe,
    /// Tyrosine
    Tyr,
    /// Tryptophan
    Trp,
    /// Methionine
    Met,
}

impl ResidueKind {
    /// Parse a three-letter residue name, or `None` if it's not a bridge residue.
    pub fn from_resn(resn: &str) -> Option<Self> {
        match resn.trim().to_uppercase().as_str() {
            "PHE" => Some(Self::Phe),
            "TYR" => Some(Self::Tyr),
            "TRP" => Some(Self::Trp),
            "MET" => Some(Self::Met),
            _ => None,
        }
    }

    /// The three-letter residue name.
    pub fn resn(&self) -> &'static str {
        match self {
            Self::Phe => "PHE",
            Self::Tyr => "TYR",
            Self::Trp => "TRP",
            Self::Met => "MET",
        }
    }

    /// PHE, TYR or TRP.
    pub fn is_aromatic(&self) -> bool {
        !matches!(self, Self::Met)
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resn())
    }
}

/// A residue taking part in an interaction graph.
///
/// Identity is the residue label, i.e. type plus sequence position (`PHE100`).
/// The chain is kept as metadata and does not take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct ResidueNode {
    /// Residue type
    pub kind: ResidueKind,
    /// Residue sequence position
    pub resi: i64,
    /// Chain identifier, empty if unknown
    pub chain: String,
}

impl ResidueNode {
    /// Build a node from an already known residue type.
    pub fn new(kind: ResidueKind, resi: i64, chain: &str) -> Self {
        Self {
            kind,
            resi,
            chain: chain.to_string(),
        }
    }

    /// Build a node from separate residue name and position fields.
    pub fn from_parts(resn: &str, resi: i64, chain: &str) -> Result<Self, BridgeError> {
        let kind = ResidueKind::from_resn(resn)
            .ok_or_else(|| BridgeError::InvalidResidue(format!("{resn}{resi}")))?;
        Ok(Self::new(kind, resi, chain))
    }

    /// The residue label, e.g. `MET438`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Whether this is the methionine of a bridge.
    pub fn is_met(&self) -> bool {
        self.kind == ResidueKind::Met
    }
}

impl FromStr for ResidueNode {
    type Err = BridgeError;

    /// Parse a residue label such as `PHE100` or `MET-3`.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        let (resn, resi) = match (label.get(..3), label.get(3..)) {
            (Some(resn), Some(resi)) => (resn, resi),
            _ => return Err(BridgeError::InvalidResidue(label.to_string())),
        };
        let resi = resi
            .parse::<i64>()
            .map_err(|_| BridgeError::InvalidResidue(label.to_string()))?;
        Self::from_parts(resn, resi, "")
    }
}

impl PartialEq for ResidueNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.resi == other.resi
    }
}

impl Eq for ResidueNode {}

impl Hash for ResidueNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.resi.hash(state);
    }
}

impl PartialOrd for ResidueNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResidueNode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.kind, self.resi).cmp(&(other.kind, other.resi))
    }
}

impl fmt::Display for ResidueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.resi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parse_labels() {
        let node: ResidueNode = "PHE100".parse().unwrap();
        assert_eq!(node.kind, ResidueKind::Phe);
        assert_eq!(node.resi, 100);
        assert_eq!(node.label(), "PHE100");

        let node: ResidueNode = "met-3".parse().unwrap();
        assert!(node.is_met());
        assert_eq!(node.resi, -3);
    }

    #[test]
    fn reject_bad_labels() {
        assert!("ALA12".parse::<ResidueNode>().is_err());
        assert!("PHE".parse::<ResidueNode>().is_err());
        assert!("PHEabc".parse::<ResidueNode>().is_err());
        assert!("".parse::<ResidueNode>().is_err());
    }

    #[test]
    fn identity_ignores_chain() {
        let a = ResidueNode::new(ResidueKind::Tyr, 10, "A");
        let b = ResidueNode::new(ResidueKind::Tyr, 10, "B");
        assert_eq!(a, b);

        let set: HashSet<ResidueNode> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn canonical_kind_order() {
        let mut kinds = vec![ResidueKind::Trp, ResidueKind::Phe, ResidueKind::Tyr];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![ResidueKind::Phe, ResidueKind::Tyr, ResidueKind::Trp]
        );
        assert!(!ResidueKind::Met.is_aromatic());
    }
}
