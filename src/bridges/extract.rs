//! Bridge validity rule and extraction from connected components.
use super::graph::ResidueGraph;
use super::pairs::normalize_pairs;
use super::structs::{Bridge, InteractionRecord};
use crate::error::BridgeError;
use crate::residues::ResidueNode;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// The smallest meaningful bridge: one methionine linking two aromatics.
pub const MIN_BRIDGE_ORDER: usize = 2;

/// Reject bridge orders below [`MIN_BRIDGE_ORDER`].
pub fn validate_order(order: usize) -> Result<(), BridgeError> {
    if order < MIN_BRIDGE_ORDER {
        return Err(BridgeError::InvalidConfiguration(format!(
            "Incorrect bridge order {order}. A bridge must be of order n >= {MIN_BRIDGE_ORDER}!"
        )));
    }
    Ok(())
}

/// Decide whether a connected component is an n-bridge.
///
/// The component must hold exactly `order + 1` residues and exactly one of them
/// must be a methionine. Larger clusters with several methionines, such as
/// MET-ARO-MET chains, are rejected as a whole.
pub fn is_valid_bridge(component: &BTreeSet<ResidueNode>, order: usize) -> bool {
    if component.len() != order + 1 {
        return false;
    }
    component.iter().filter(|r| r.is_met()).count() == 1
}

/// Turn an accepted component into a [`Bridge`].
fn component_to_bridge(
    code: &str,
    ec: Option<&str>,
    component: BTreeSet<ResidueNode>,
) -> Option<Bridge> {
    let (mut mets, aromatics): (Vec<ResidueNode>, Vec<ResidueNode>) =
        component.into_iter().partition(|r| r.is_met());
    let methionine = mets.pop()?;
    Some(Bridge {
        code: code.to_string(),
        ec: ec.map(|s| s.to_string()),
        methionine,
        aromatics,
    })
}

/// Find all bridges of the given order in an interaction graph.
pub fn bridges_from_graph(
    graph: &ResidueGraph,
    code: &str,
    ec: Option<&str>,
    order: usize,
) -> Result<Vec<Bridge>, BridgeError> {
    validate_order(order)?;

    let mut bridges = Vec::new();
    for component in graph.connected_components() {
        if !is_valid_bridge(&component, order) {
            trace!(
                "Discarding component of {} residue(s) in {code}: {:?}",
                component.len(),
                component.iter().map(|r| r.label()).collect::<Vec<_>>()
            );
            continue;
        }
        if let Some(bridge) = component_to_bridge(code, ec, component) {
            bridges.push(bridge);
        }
    }
    Ok(bridges)
}

/// Extract n-bridges from the raw interaction records of one structure entry.
///
/// An entry without any records, or without any qualifying component, yields
/// an empty list rather than an error.
pub fn extract_bridges(
    code: &str,
    ec: Option<&str>,
    records: &[InteractionRecord],
    order: usize,
) -> Result<Vec<Bridge>, BridgeError> {
    validate_order(order)?;

    let pairs = normalize_pairs(records);
    let graph = ResidueGraph::from_pairs(&pairs);
    debug!(
        "{code}: {} record(s) collapsed to {} pair(s) over {} residue(s)",
        records.len(),
        pairs.len(),
        graph.node_count()
    );

    let bridges = bridges_from_graph(&graph, code, ec, order)?;
    debug!("{code}: found {} {order}-bridge(s)", bridges.len());
    Ok(bridges)
}
