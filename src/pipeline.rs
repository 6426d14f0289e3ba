//! Per-entry analysis and parallel batch processing.
use crate::bridges::{extract_bridges, Bridge, InteractionRecord};
use crate::chains::build_chains;
use crate::counts::{
    count_bridges, count_bridges_by_ec, multiplicity_breakdown, BridgeCountTable, GroupedCounts,
};
use crate::error::BridgeError;
use crate::relations::{compare_networks, RelationshipRecord, RelationshipSummary};
use crate::residues::ResidueNode;
use crate::scalene::{scalene_records, LigandAnchor, ScaleneRecord, SurfaceAtom, SurfaceIndex};
use crate::settings::Settings;

use nalgebra as na;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Everything known about one structure entry, as handed over by the
/// upstream collaborators.
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    /// Structure entry identifier
    pub code: String,
    /// Full EC classifier, if known
    pub ec: Option<String>,
    /// Raw aromatic-methionine measurements
    pub interactions: Vec<InteractionRecord>,
    /// Pairs of residue labels lying close to each other, used to build TYR/TRP chains
    pub proximity: Vec<(String, String)>,
    /// Solvent-exposed atoms
    pub surface: Vec<SurfaceAtom>,
    /// SD position of each methionine
    pub sulfurs: HashMap<ResidueNode, na::Point3<f64>>,
    /// Metal or ligand atoms
    pub ligands: Vec<LigandAnchor>,
}

impl EntryInput {
    /// An empty entry with the given code.
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Default::default()
        }
    }
}

/// Results for a single structure entry.
#[derive(Debug, Clone)]
pub struct EntryReport {
    /// Structure entry identifier
    pub code: String,
    /// Bridges of the requested order
    pub bridges: Vec<Bridge>,
    /// Pair-type counts over `bridges`
    pub counts: BridgeCountTable,
    /// Counts per top-level EC class, empty unless [`Settings::group_by_ec`] is set
    pub grouped_counts: GroupedCounts,
    /// Lone-pair multiplicity histogram of the raw interaction records
    pub multiplicity: BTreeMap<usize, usize>,
    /// One record per (chain, bridge) pair
    pub relationships: Vec<RelationshipRecord>,
    /// One record per (bridge, ligand anchor) pair
    pub scalene: Vec<ScaleneRecord>,
}

/// An entry that could not be analyzed.
#[derive(Debug)]
pub struct EntryFailure {
    /// Structure entry identifier
    pub code: String,
    /// Why the entry was rejected
    pub error: BridgeError,
}

/// Results over many structure entries.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful entries, in input order
    pub entries: Vec<EntryReport>,
    /// Failed entries, in input order
    pub failures: Vec<EntryFailure>,
    /// Pair-type counts over all successful entries
    pub counts: BridgeCountTable,
    /// Counts per top-level EC class over all successful entries, empty unless
    /// [`Settings::group_by_ec`] is set
    pub grouped_counts: GroupedCounts,
    /// Lone-pair multiplicity histogram over all successful entries
    pub multiplicity: BTreeMap<usize, usize>,
    /// Relationship tally over all successful entries
    pub relationships: RelationshipSummary,
}

impl BatchReport {
    /// All bridges, in entry order.
    pub fn bridges(&self) -> Vec<Bridge> {
        self.entries
            .iter()
            .flat_map(|e| e.bridges.iter().cloned())
            .collect()
    }

    /// All relationship records, in entry order.
    pub fn relationship_records(&self) -> Vec<RelationshipRecord> {
        self.entries
            .iter()
            .flat_map(|e| e.relationships.iter().cloned())
            .collect()
    }

    /// All scalene records, in entry order.
    pub fn scalene_records(&self) -> Vec<ScaleneRecord> {
        self.entries
            .iter()
            .flat_map(|e| e.scalene.iter().cloned())
            .collect()
    }
}

fn check_point(code: &str, what: &str, p: &na::Point3<f64>) -> Result<(), BridgeError> {
    if p.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(BridgeError::MalformedCoordinates {
            code: code.to_string(),
            detail: format!("{what} at ({}, {}, {})", p.x, p.y, p.z),
        })
    }
}

fn check_entry(entry: &EntryInput) -> Result<(), BridgeError> {
    for r in &entry.interactions {
        if !r.aromatic.kind.is_aromatic() {
            return Err(BridgeError::InvalidResidue(format!(
                "{} in aromatic position",
                r.aromatic
            )));
        }
        if !r.methionine.is_met() {
            return Err(BridgeError::InvalidResidue(format!(
                "{} in methionine position",
                r.methionine
            )));
        }
    }
    for a in &entry.surface {
        check_point(&entry.code, &format!("surface atom {}{}", a.atomn, a.resi), &a.position)?;
    }
    for (met, p) in &entry.sulfurs {
        check_point(&entry.code, &format!("{met} SD"), p)?;
    }
    for l in &entry.ligands {
        check_point(&entry.code, &l.label, &l.position)?;
    }
    Ok(())
}

/// Run the full analysis on one structure entry.
///
/// Chains are only compared when proximity pairs are present, and scalene
/// triangles only when both ligand anchors and surface atoms are.
pub fn analyze_entry(entry: &EntryInput, settings: &Settings) -> Result<EntryReport, BridgeError> {
    settings.validate()?;
    check_entry(entry)?;
    let code = entry.code.as_str();

    let bridges = extract_bridges(code, entry.ec.as_deref(), &entry.interactions, settings.order)?;

    let relationships = if entry.proximity.is_empty() {
        Vec::new()
    } else {
        let chains = build_chains(&entry.proximity)?;
        debug!("{code}: built {} chain(s)", chains.len());
        compare_networks(code, &chains, &bridges)?
    };

    let ligands: Vec<LigandAnchor> = entry
        .ligands
        .iter()
        .filter(|l| !settings.metals_only || l.is_metal())
        .cloned()
        .collect();
    let scalene = if ligands.is_empty() || entry.surface.is_empty() {
        Vec::new()
    } else {
        let surface = SurfaceIndex::new(entry.surface.clone());
        scalene_records(code, &bridges, &entry.sulfurs, &ligands, &surface)
    };

    Ok(EntryReport {
        code: entry.code.clone(),
        counts: count_bridges(&bridges),
        grouped_counts: if settings.group_by_ec {
            count_bridges_by_ec(&bridges)
        } else {
            GroupedCounts::new()
        },
        multiplicity: multiplicity_breakdown(&entry.interactions),
        bridges,
        relationships,
        scalene,
    })
}

/// Analyze many entries in parallel on the current rayon pool.
///
/// Invalid settings abort the whole batch. Any other error only marks its own
/// entry as failed; the remaining entries are still reported and aggregated.
pub fn analyze_batch(
    entries: Vec<EntryInput>,
    settings: &Settings,
) -> Result<BatchReport, BridgeError> {
    settings.validate()?;

    let results: Vec<(String, Result<EntryReport, BridgeError>)> = entries
        .par_iter()
        .map(|e| (e.code.clone(), analyze_entry(e, settings)))
        .collect();

    let mut report = BatchReport::default();
    for (code, result) in results {
        match result {
            Ok(entry) => report.entries.push(entry),
            Err(error) => {
                warn!("Skipping entry {code}: {error}");
                report.failures.push(EntryFailure { code, error });
            }
        }
    }

    report.counts = report
        .entries
        .par_iter()
        .map(|e| e.counts.clone())
        .reduce(BridgeCountTable::new, BridgeCountTable::merged);
    report.grouped_counts = report
        .entries
        .par_iter()
        .map(|e| e.grouped_counts.clone())
        .reduce(GroupedCounts::new, GroupedCounts::merged);
    for e in &report.entries {
        for (multiplicity, pairs) in &e.multiplicity {
            *report.multiplicity.entry(*multiplicity).or_insert(0) += pairs;
        }
        report.relationships.add_entry(&e.relationships);
    }

    info!(
        "Analyzed {} entries ({} failed), found {} bridge(s)",
        report.entries.len() + report.failures.len(),
        report.failures.len(),
        report.counts.total()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residues::ResidueKind;
    use crate::scalene::TriangleClass;

    fn record(code: &str, aromatic: &str, met: &str) -> InteractionRecord {
        InteractionRecord {
            code: code.to_string(),
            ec: None,
            aromatic: aromatic.parse().unwrap(),
            methionine: met.parse().unwrap(),
            norm: 5.0,
            met_theta: 100.0,
            met_phi: 90.0,
        }
    }

    fn entry(code: &str, ec: Option<&str>, pairs: &[(&str, &str)]) -> EntryInput {
        let mut entry = EntryInput::new(code);
        entry.ec = ec.map(|s| s.to_string());
        entry.interactions = pairs.iter().map(|(a, m)| record(code, a, m)).collect();
        entry
    }

    #[test]
    fn single_entry() {
        let mut input = entry(
            "5xfq",
            Some("3.4.21.4"),
            &[("TYR188", "MET201"), ("TRP210", "MET201"), ("TRP210", "MET201")],
        );
        input.proximity = vec![("TYR188".to_string(), "TRP210".to_string())];

        let by_ec = Settings {
            group_by_ec: true,
            ..Default::default()
        };
        let report = analyze_entry(&input, &by_ec).unwrap();
        assert_eq!(report.bridges.len(), 1);
        assert_eq!(report.counts.get("TYR-TRP"), 1);
        assert_eq!(report.grouped_counts.get("3").unwrap().total(), 1);
        assert_eq!(report.multiplicity, BTreeMap::from([(1, 1), (2, 1)]));
        assert_eq!(report.relationships.len(), 1);
        assert!(report.scalene.is_empty());
    }

    #[test]
    fn scalene_and_metal_filter() {
        let mut input = entry("1abc", None, &[("PHE1", "MET5"), ("PHE9", "MET5")]);
        input.sulfurs.insert(
            ResidueNode::new(ResidueKind::Met, 5, "A"),
            na::Point3::new(0.0, 0.0, 0.0),
        );
        input.surface = vec![SurfaceAtom {
            chain: "A".to_string(),
            resi: 12,
            atomn: "OG".to_string(),
            position: na::Point3::new(0.0, 4.0, 0.0),
        }];
        input.ligands = vec![
            LigandAnchor {
                label: "ZN300".to_string(),
                element: "ZN".to_string(),
                position: na::Point3::new(3.0, 0.0, 0.0),
            },
            LigandAnchor {
                label: "HEM400".to_string(),
                element: "C".to_string(),
                position: na::Point3::new(-3.0, 0.0, 0.0),
            },
        ];

        let report = analyze_entry(&input, &Settings::default()).unwrap();
        assert_eq!(report.scalene.len(), 2);
        assert_eq!(report.scalene[0].class, TriangleClass::PhePhe);
        assert!((report.scalene[0].triangle.area - 6.0).abs() < 1e-9);

        let metals_only = Settings {
            metals_only: true,
            ..Default::default()
        };
        let report = analyze_entry(&input, &metals_only).unwrap();
        assert_eq!(report.scalene.len(), 1);
        assert_eq!(report.scalene[0].ligand, "ZN300");
    }

    #[test]
    fn malformed_coordinates() {
        let mut input = entry("1abc", None, &[]);
        input.ligands = vec![LigandAnchor {
            label: "FE1".to_string(),
            element: "FE".to_string(),
            position: na::Point3::new(f64::NAN, 0.0, 0.0),
        }];
        assert!(matches!(
            analyze_entry(&input, &Settings::default()),
            Err(BridgeError::MalformedCoordinates { .. })
        ));
    }

    #[test]
    fn wrong_residue_in_methionine_slot() {
        let input = entry("1abc", None, &[("PHE1", "TYR5")]);
        assert!(matches!(
            analyze_entry(&input, &Settings::default()),
            Err(BridgeError::InvalidResidue(_))
        ));
    }

    #[test]
    fn batch_isolates_failures() {
        let mut broken = entry("2bad", None, &[("PHE1", "MET2"), ("TYR3", "MET2")]);
        broken.surface = vec![SurfaceAtom {
            chain: "A".to_string(),
            resi: 1,
            atomn: "N".to_string(),
            position: na::Point3::new(f64::INFINITY, 0.0, 0.0),
        }];
        let entries = vec![
            entry("1aaa", Some("1.1.1.1"), &[("PHE1", "MET2"), ("TYR3", "MET2")]),
            broken,
            entry("3ccc", None, &[("TRP7", "MET8"), ("TRP9", "MET8")]),
        ];

        let settings = Settings {
            group_by_ec: true,
            ..Default::default()
        };
        let report = analyze_batch(entries, &settings).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].code, "2bad");
        assert_eq!(report.counts.get("PHE-TYR"), 1);
        assert_eq!(report.counts.get("TRP-TRP"), 1);
        assert_eq!(report.counts, count_bridges(&report.bridges()));
        assert_eq!(report.grouped_counts.get("0").unwrap().total(), 1);
        assert_eq!(report.grouped_counts.flatten(), report.counts);
    }

    #[test]
    fn batch_rejects_bad_order() {
        let settings = Settings {
            order: 1,
            ..Default::default()
        };
        assert!(matches!(
            analyze_batch(vec![EntryInput::new("1abc")], &settings),
            Err(BridgeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn ec_grouping_is_opt_in() {
        let entries = vec![
            entry("1aaa", Some("1.1.1.1"), &[("PHE1", "MET2"), ("TYR3", "MET2")]),
            entry("2bbb", Some("4.2.1.1"), &[("TRP7", "MET8"), ("TRP9", "MET8")]),
        ];
        let report = analyze_batch(entries.clone(), &Settings::default()).unwrap();
        assert_eq!(report.counts.total(), 2);
        assert!(report.grouped_counts.is_empty());
        assert!(report.entries.iter().all(|e| e.grouped_counts.is_empty()));

        let settings = Settings {
            group_by_ec: true,
            ..Default::default()
        };
        let report = analyze_batch(entries, &settings).unwrap();
        assert_eq!(report.grouped_counts.get("1").unwrap().get("PHE-TYR"), 1);
        assert_eq!(report.grouped_counts.get("4").unwrap().get("TRP-TRP"), 1);
    }

    #[test]
    fn empty_batch() {
        let report = analyze_batch(Vec::new(), &Settings::default()).unwrap();
        assert!(report.entries.is_empty());
        assert!(report.counts.is_empty());
    }
}
