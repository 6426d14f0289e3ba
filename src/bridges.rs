//! Met-aromatic bridge extraction.
//!
//! Raw interaction records are collapsed into residue pairs, assembled into an
//! undirected graph, and every connected component of `order + 1` residues
//! holding exactly one methionine is reported as a bridge.
pub mod extract;
pub mod graph;
pub mod pairs;
pub mod structs;

// Re-exports
pub use extract::{
    bridges_from_graph, extract_bridges, is_valid_bridge, validate_order, MIN_BRIDGE_ORDER,
};
pub use graph::ResidueGraph;
pub use pairs::{normalize_pairs, ResiduePair};
pub use structs::{Bridge, InteractionRecord};

use crate::counts::ec_class;
use polars::prelude::*;

/// Convert a slice of [`Bridge`] into a Polars `DataFrame`.
///
/// Columns: `code`, `ec`, `ec_class`, `met`, `met_chain`, `aromatics`, `label`, `order`.
pub fn bridges_to_df(bridges: &[Bridge]) -> PolarsResult<DataFrame> {
    df!(
        "code" => bridges.iter().map(|b| b.code.clone()).collect::<Vec<String>>(),
        "ec" => bridges.iter().map(|b| b.ec.clone()).collect::<Vec<Option<String>>>(),
        "ec_class" => bridges.iter().map(|b| ec_class(b.ec.as_deref())).collect::<Vec<String>>(),
        "met" => bridges.iter().map(|b| b.methionine.label()).collect::<Vec<String>>(),
        "met_chain" => bridges.iter().map(|b| b.methionine.chain.clone()).collect::<Vec<String>>(),
        "aromatics" => bridges.iter().map(|b| b.aromatic_labels().join(",")).collect::<Vec<String>>(),
        "label" => bridges.iter().map(|b| b.label()).collect::<Vec<String>>(),
        "order" => bridges.iter().map(|b| b.order() as u32).collect::<Vec<u32>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residues::{ResidueKind, ResidueNode};

    #[test]
    fn bridges_frame() {
        let bridges = vec![Bridge {
            code: "8nse".to_string(),
            ec: Some("1.14.13.39".to_string()),
            methionine: ResidueNode::new(ResidueKind::Met, 209, "A"),
            aromatics: vec![
                ResidueNode::new(ResidueKind::Phe, 233, "A"),
                ResidueNode::new(ResidueKind::Phe, 243, "A"),
            ],
        }];
        let df = bridges_to_df(&bridges).unwrap();
        assert_eq!(df.height(), 1);
        let label = df.column("label").unwrap().str().unwrap().get(0);
        assert_eq!(label, Some("PHE-PHE"));
        let ec = df.column("ec_class").unwrap().str().unwrap().get(0);
        assert_eq!(ec, Some("1"));
    }
}
