//! Aggregation of bridges into pair-type counts.
//!
//! Bridge member types are canonicalized so that `TYR-PHE` and `PHE-TYR` count
//! as the same category, then tallied either over a flat collection or per
//! top-level EC class.
use crate::bridges::{Bridge, InteractionRecord};
use crate::error::BridgeError;
use crate::residues::ResidueKind;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// The six canonical 2-bridge categories, in reporting order.
pub const PAIR_CATEGORIES: [&str; 6] = [
    "PHE-PHE", "TYR-TYR", "TRP-TRP", "TYR-TRP", "PHE-TYR", "PHE-TRP",
];

/// EC bucket for entries without an EC classifier.
pub const UNCLASSIFIED_EC: &str = "0";

const AROMATIC_KINDS: [ResidueKind; 3] = [ResidueKind::Phe, ResidueKind::Tyr, ResidueKind::Trp];

/// Order-independent label for a set of residue types, e.g. `PHE-TYR`.
pub fn canonical_label(kinds: impl IntoIterator<Item = ResidueKind>) -> String {
    let mut kinds: Vec<ResidueKind> = kinds.into_iter().collect();
    kinds.sort();
    kinds
        .iter()
        .map(|k| k.resn())
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical label from residue labels, stripping the sequence positions first.
///
/// `["TYR123", "PHE45"]` gives `PHE-TYR`.
pub fn canonical_label_from_residues<S: AsRef<str>>(labels: &[S]) -> Result<String, BridgeError> {
    let kinds = labels
        .iter()
        .map(|l| {
            let resn: String = l
                .as_ref()
                .chars()
                .filter(|c| !c.is_ascii_digit() && *c != '-')
                .collect();
            ResidueKind::from_resn(&resn)
                .ok_or_else(|| BridgeError::InvalidResidue(l.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(canonical_label(kinds))
}

/// Top-level EC class of a full EC code, e.g. `1.2.3.56` gives `1`.
/// Missing or empty codes fall into [`UNCLASSIFIED_EC`].
pub fn ec_class(ec: Option<&str>) -> String {
    match ec.and_then(|e| e.split('.').next()).map(str::trim) {
        Some(class) if !class.is_empty() && class != "-" => class.to_string(),
        _ => UNCLASSIFIED_EC.to_string(),
    }
}

/// Counts of bridges per canonical pair-type label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeCountTable {
    counts: BTreeMap<String, u64>,
}

impl BridgeCountTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one bridge.
    pub fn add(&mut self, bridge: &Bridge) {
        self.add_label(bridge.label(), 1);
    }

    fn add_label(&mut self, label: String, n: u64) {
        if n > 0 {
            *self.counts.entry(label).or_insert(0) += n;
        }
    }

    /// Count for a label, zero if never seen.
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Total number of bridges counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Whether no bridge has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Share of all counted bridges carrying `label`, or 0 for an empty table.
    pub fn fraction(&self, label: &str) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(label) as f64 / total as f64,
        }
    }

    /// Iterate over the non-zero (label, count) entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Fold another table into this one. The merge is associative and commutative.
    pub fn merge(&mut self, other: &BridgeCountTable) {
        for (label, n) in other.iter() {
            self.add_label(label.to_string(), n);
        }
    }

    /// Owned variant of [`BridgeCountTable::merge`], handy as a reduce step.
    pub fn merged(mut self, other: BridgeCountTable) -> Self {
        self.merge(&other);
        self
    }

    /// Upper-triangular 3x3 matrix of 2-bridge counts, rows and columns ordered PHE, TYR, TRP.
    pub fn matrix(&self) -> [[u64; 3]; 3] {
        let mut matrix = [[0; 3]; 3];
        for (i, a) in AROMATIC_KINDS.iter().enumerate() {
            for (j, b) in AROMATIC_KINDS.iter().enumerate().skip(i) {
                matrix[i][j] = self.get(&canonical_label([*a, *b]));
            }
        }
        matrix
    }
}

impl<'a> FromIterator<&'a Bridge> for BridgeCountTable {
    fn from_iter<I: IntoIterator<Item = &'a Bridge>>(iter: I) -> Self {
        let mut table = Self::new();
        for bridge in iter {
            table.add(bridge);
        }
        table
    }
}

/// Bridge counts partitioned by top-level EC class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCounts {
    groups: BTreeMap<String, BridgeCountTable>,
}

impl GroupedCounts {
    /// Create an empty grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for one EC class, if any bridge fell into it.
    pub fn get(&self, ec_class: &str) -> Option<&BridgeCountTable> {
        self.groups.get(ec_class)
    }

    /// Whether no group has been created.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(ec_class, table)` in class order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BridgeCountTable)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fold another grouping into this one, class by class.
    pub fn merge(&mut self, other: &GroupedCounts) {
        for (class, table) in other.iter() {
            self.groups.entry(class.to_string()).or_default().merge(table);
        }
    }

    /// Merge `other` into `self`, taking ownership of both.
    pub fn merged(mut self, other: GroupedCounts) -> Self {
        self.merge(&other);
        self
    }

    /// Collapse all classes into a single table.
    pub fn flatten(&self) -> BridgeCountTable {
        self.groups
            .values()
            .fold(BridgeCountTable::new(), |acc, t| acc.merged(t.clone()))
    }
}

/// Count a flat collection of bridges.
pub fn count_bridges(bridges: &[Bridge]) -> BridgeCountTable {
    bridges.iter().collect()
}

/// Group bridges by top-level EC class, then count each group independently.
///
/// Group membership only depends on the extracted class, not on input order.
pub fn count_bridges_by_ec(bridges: &[Bridge]) -> GroupedCounts {
    let mut groups: BTreeMap<String, BridgeCountTable> = BTreeMap::new();
    for bridge in bridges {
        groups
            .entry(ec_class(bridge.ec.as_deref()))
            .or_default()
            .add(bridge);
    }
    GroupedCounts { groups }
}

/// Histogram of how many geometric measurements back each residue pair.
///
/// Records are grouped per `(code, aromatic, methionine)`; the result maps a
/// multiplicity to the number of pairs observed with it.
pub fn multiplicity_breakdown(records: &[InteractionRecord]) -> BTreeMap<usize, usize> {
    let mut per_pair: HashMap<(&str, String, String), usize> = HashMap::new();
    for r in records {
        *per_pair
            .entry((r.code.as_str(), r.aromatic.label(), r.methionine.label()))
            .or_insert(0) += 1;
    }

    let mut breakdown = BTreeMap::new();
    for multiplicity in per_pair.into_values() {
        *breakdown.entry(multiplicity).or_insert(0) += 1;
    }
    breakdown
}

/// Convert a count table into a Polars `DataFrame` with columns `label`, `count`, `fraction`.
///
/// For 2-bridges all six canonical categories are listed, including empty ones.
pub fn counts_to_df(table: &BridgeCountTable, order: usize) -> PolarsResult<DataFrame> {
    let labels = table_labels(table, order);
    df!(
        "label" => labels.clone(),
        "count" => labels.iter().map(|l| table.get(l)).collect::<Vec<u64>>(),
        "fraction" => labels.iter().map(|l| table.fraction(l)).collect::<Vec<f64>>(),
    )
}

/// Convert grouped counts into a long-format `DataFrame` with columns `ec_class`, `label`, `count`.
pub fn grouped_counts_to_df(grouped: &GroupedCounts, order: usize) -> PolarsResult<DataFrame> {
    let mut classes = Vec::new();
    let mut labels = Vec::new();
    let mut counts = Vec::new();
    for (class, table) in grouped.iter() {
        for label in table_labels(table, order) {
            classes.push(class.to_string());
            counts.push(table.get(&label));
            labels.push(label);
        }
    }
    df!(
        "ec_class" => classes,
        "label" => labels,
        "count" => counts,
    )
}

/// Convert a multiplicity histogram into a `DataFrame` with columns `multiplicity`, `pairs`.
pub fn multiplicity_to_df(breakdown: &BTreeMap<usize, usize>) -> PolarsResult<DataFrame> {
    df!(
        "multiplicity" => breakdown.keys().map(|k| *k as u32).collect::<Vec<u32>>(),
        "pairs" => breakdown.values().map(|v| *v as u32).collect::<Vec<u32>>(),
    )
}

fn table_labels(table: &BridgeCountTable, order: usize) -> Vec<String> {
    let mut labels: Vec<String> = match order {
        2 => PAIR_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    };
    for (label, _) in table.iter() {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residues::ResidueNode;

    fn bridge(code: &str, ec: Option<&str>, aromatics: &[&str]) -> Bridge {
        Bridge {
            code: code.to_string(),
            ec: ec.map(|s| s.to_string()),
            methionine: "MET1".parse().unwrap(),
            aromatics: aromatics
                .iter()
                .map(|l| l.parse::<ResidueNode>().unwrap())
                .collect(),
        }
    }

    #[test]
    fn label_is_commutative() {
        for a in AROMATIC_KINDS {
            for b in AROMATIC_KINDS {
                assert_eq!(canonical_label([a, b]), canonical_label([b, a]));
                assert!(PAIR_CATEGORIES.contains(&canonical_label([a, b]).as_str()));
            }
        }
        assert_eq!(canonical_label([ResidueKind::Tyr, ResidueKind::Phe]), "PHE-TYR");
        assert_eq!(canonical_label([ResidueKind::Trp, ResidueKind::Tyr]), "TYR-TRP");
    }

    #[test]
    fn label_from_residue_strings() {
        assert_eq!(
            canonical_label_from_residues(&["TYR123", "PHE45"]).unwrap(),
            "PHE-TYR"
        );
        assert_eq!(
            canonical_label_from_residues(&["TRP1", "TRP-2"]).unwrap(),
            "TRP-TRP"
        );
        assert!(canonical_label_from_residues(&["HIS1", "PHE2"]).is_err());
    }

    #[test]
    fn ec_classes() {
        assert_eq!(ec_class(Some("1.2.3.56")), "1");
        assert_eq!(ec_class(Some("3.4.21.-")), "3");
        assert_eq!(ec_class(Some("")), "0");
        assert_eq!(ec_class(Some("  ")), "0");
        assert_eq!(ec_class(None), "0");
    }

    #[test]
    fn simple_count() {
        let table = count_bridges(&[bridge("a", None, &["PHE100", "PHE200"])]);
        assert_eq!(table.get("PHE-PHE"), 1);
        assert_eq!(table.total(), 1);
        assert_eq!(table.iter().count(), 1);
        assert!(count_bridges(&[]).is_empty());
    }

    #[test]
    fn counts_invariant_under_reordering() {
        let mut bridges = vec![
            bridge("a", Some("1.1"), &["PHE1", "TYR2"]),
            bridge("a", Some("1.1"), &["TYR3", "PHE4"]),
            bridge("b", Some("2.1"), &["TRP1", "TRP2"]),
            bridge("c", None, &["TYR1", "TRP2"]),
            bridge("c", None, &["PHE1", "PHE2"]),
        ];
        let forward = count_bridges(&bridges);
        let forward_grouped = count_bridges_by_ec(&bridges);
        bridges.reverse();
        bridges.swap(0, 2);
        assert_eq!(forward, count_bridges(&bridges));
        assert_eq!(forward_grouped, count_bridges_by_ec(&bridges));
        assert_eq!(forward.get("PHE-TYR"), 2);
        assert_eq!(forward.total(), 5);
    }

    #[test]
    fn grouping_by_single_class_matches_flat_count() {
        let bridges = vec![
            bridge("a", Some("3.4.21.4"), &["PHE1", "TYR2"]),
            bridge("b", Some("3.1.1.1"), &["TRP1", "TRP2"]),
            bridge("c", Some("3"), &["PHE1", "PHE2"]),
        ];
        let grouped = count_bridges_by_ec(&bridges);
        assert_eq!(grouped.iter().count(), 1);
        assert_eq!(grouped.get("3"), Some(&count_bridges(&bridges)));
        assert!(grouped.get("1").is_none());
        assert_eq!(grouped.flatten(), count_bridges(&bridges));
    }

    #[test]
    fn unclassified_bucket() {
        let bridges = vec![
            bridge("a", Some(""), &["PHE1", "TYR2"]),
            bridge("b", None, &["PHE1", "TYR2"]),
            bridge("c", Some("6.1.1.1"), &["PHE1", "TYR2"]),
        ];
        let grouped = count_bridges_by_ec(&bridges);
        assert_eq!(grouped.get(UNCLASSIFIED_EC).unwrap().get("PHE-TYR"), 2);
        assert_eq!(grouped.get("6").unwrap().total(), 1);
    }

    #[test]
    fn merge_is_associative_and_commutative() {
        let a = count_bridges(&[bridge("a", None, &["PHE1", "TYR2"])]);
        let b = count_bridges(&[bridge("b", None, &["TRP1", "TYR2"])]);
        let c = count_bridges(&[
            bridge("c", None, &["PHE1", "TYR2"]),
            bridge("c", None, &["PHE3", "PHE4"]),
        ]);
        let left = a.clone().merged(b.clone()).merged(c.clone());
        let right = c.clone().merged(b.clone().merged(a.clone()));
        assert_eq!(left, right);
        assert_eq!(left.get("PHE-TYR"), 2);
        assert_eq!(left.merged(BridgeCountTable::new()).total(), 4);
    }

    #[test]
    fn heatmap_matrix() {
        let table = count_bridges(&[
            bridge("a", None, &["PHE1", "PHE2"]),
            bridge("a", None, &["PHE1", "TYR2"]),
            bridge("a", None, &["TYR1", "TRP2"]),
            bridge("a", None, &["TRP1", "TRP2"]),
        ]);
        let m = table.matrix();
        assert_eq!(m, [[1, 1, 0], [0, 0, 1], [0, 0, 1]]);
        assert!((table.fraction("PHE-PHE") - 0.25).abs() < 1e-12);
        assert_eq!(BridgeCountTable::new().fraction("PHE-PHE"), 0.0);
    }

    #[test]
    fn multiplicity_histogram() {
        let record = |aro: &str, met: &str| InteractionRecord {
            code: "5xfq".to_string(),
            ec: None,
            aromatic: aro.parse().unwrap(),
            methionine: met.parse().unwrap(),
            norm: 5.0,
            met_theta: 90.0,
            met_phi: 90.0,
        };
        let records = vec![
            record("PHE462", "MET438"),
            record("PHE462", "MET438"),
            record("PHE462", "MET438"),
            record("PHE462", "MET438"),
            record("PHE472", "MET438"),
            record("PHE472", "MET438"),
            record("TYR10", "MET438"),
            record("TYR11", "MET438"),
        ];
        let breakdown = multiplicity_breakdown(&records);
        assert_eq!(breakdown, BTreeMap::from([(1, 2), (2, 1), (4, 1)]));
    }

    #[test]
    fn counts_frames() {
        let table = count_bridges(&[bridge("a", None, &["PHE1", "PHE2"])]);
        let df = counts_to_df(&table, 2).unwrap();
        assert_eq!(df.height(), 6);

        let grouped = count_bridges_by_ec(&[
            bridge("a", Some("1.1.1.1"), &["PHE1", "PHE2"]),
            bridge("b", None, &["PHE1", "TYR2"]),
        ]);
        let df = grouped_counts_to_df(&grouped, 2).unwrap();
        assert_eq!(df.height(), 12);

        let three = count_bridges(&[bridge("a", None, &["PHE1", "PHE2", "TYR3"])]);
        let df = counts_to_df(&three, 3).unwrap();
        assert_eq!(df.height(), 1);
    }
}
