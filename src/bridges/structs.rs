//! Interaction and bridge records.
use crate::counts::canonical_label;
use crate::residues::ResidueNode;
use core::fmt;

/// One geometric measurement between an aromatic residue and a methionine,
/// as reported by the interaction-detection step.
///
/// Several records may exist for the same residue pair, one per lone-pair vector.
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    /// Structure entry identifier
    pub code: String,
    /// Full EC classifier of the entry, if known
    pub ec: Option<String>,
    /// The PHE, TYR or TRP residue
    pub aromatic: ResidueNode,
    /// The MET residue
    pub methionine: ResidueNode,
    /// Norm of the SD to aromatic-midpoint vector
    pub norm: f64,
    /// Polar angle of the lone-pair vector, in degrees
    pub met_theta: f64,
    /// Azimuthal angle of the lone-pair vector, in degrees
    pub met_phi: f64,
}

/// A methionine simultaneously linked to exactly `order` aromatic residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    /// Structure entry identifier
    pub code: String,
    /// Full EC classifier of the entry, if known
    pub ec: Option<String>,
    /// The single methionine anchoring the bridge
    pub methionine: ResidueNode,
    /// The bridged aromatic residues, sorted
    pub aromatics: Vec<ResidueNode>,
}

impl Bridge {
    /// Number of aromatic residues in the bridge.
    pub fn order(&self) -> usize {
        self.aromatics.len()
    }

    /// Canonical pair-type label, e.g. `PHE-TYR`.
    pub fn label(&self) -> String {
        canonical_label(self.aromatics.iter().map(|r| r.kind))
    }

    /// Residue labels of the aromatic members.
    pub fn aromatic_labels(&self) -> Vec<String> {
        self.aromatics.iter().map(|r| r.label()).collect()
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members = self.aromatic_labels();
        members.insert(members.len() / 2, self.methionine.label());
        write!(f, "[{}] {}", self.code, members.join(" : "))
    }
}
