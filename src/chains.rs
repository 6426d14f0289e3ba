//! Chains of spatially adjacent TYR/TRP residues.
use crate::bridges::ResidueGraph;
use crate::error::BridgeError;
use crate::residues::{ResidueKind, ResidueNode};
use std::collections::BTreeSet;
use tracing::warn;

/// A cluster of spatially adjacent TYR/TRP residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainComponent {
    /// TYR and TRP residues of the chain
    pub members: BTreeSet<ResidueNode>,
}

impl ChainComponent {
    /// Number of residues in the chain.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the chain has no residues.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Residue labels, in canonical order.
    pub fn labels(&self) -> Vec<String> {
        self.members.iter().map(|r| r.label()).collect()
    }
}

fn is_chain_residue(node: &ResidueNode) -> bool {
    matches!(node.kind, ResidueKind::Tyr | ResidueKind::Trp)
}

/// Group proximity pairs of TYR/TRP residues into chains.
///
/// Self-pairs are skipped, as are pairs naming a residue other than TYR or TRP.
/// Unparseable labels are an error for the entry.
pub fn build_chains<A: AsRef<str>, B: AsRef<str>>(
    pairs: &[(A, B)],
) -> Result<Vec<ChainComponent>, BridgeError> {
    let mut graph = ResidueGraph::new();
    for (a, b) in pairs {
        let a: ResidueNode = a.as_ref().parse()?;
        let b: ResidueNode = b.as_ref().parse()?;
        if !(is_chain_residue(&a) && is_chain_residue(&b)) {
            warn!("Ignoring proximity pair {a}-{b}: chains only hold TYR/TRP residues");
            continue;
        }
        graph.add_edge(a, b);
    }

    Ok(graph
        .connected_components()
        .into_iter()
        .map(|members| ChainComponent { members })
        .collect())
}
