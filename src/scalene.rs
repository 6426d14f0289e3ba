//! Scalene triangles between a bridging methionine, a metal or ligand atom and
//! the protein surface.
//!
//! For every bridge with a known SD position and every ligand anchor of the same
//! entry, the solvent-exposed atom closest to either anchor is located and the
//! triangle SD / MT / SF is measured.
use crate::bridges::Bridge;
use crate::residues::{ResidueKind, ResidueNode};
use core::fmt;
use nalgebra as na;
use polars::prelude::*;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashMap;
use tracing::trace;

/// Element symbols treated as metal anchors.
const METALS: [&str; 10] = ["SC", "TI", "V", "CR", "MN", "FE", "CO", "NI", "CU", "ZN"];

/// A solvent-exposed atom reported by the surface-exposure step.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAtom {
    /// Chain identifier
    pub chain: String,
    /// Residue sequence position
    pub resi: i64,
    /// Atom name
    pub atomn: String,
    /// Cartesian coordinates in Å
    pub position: na::Point3<f64>,
}

/// A metal or ligand atom used as the second triangle vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct LigandAnchor {
    /// Free-form identifier, e.g. `ZN403`
    pub label: String,
    /// Element symbol
    pub element: String,
    /// Cartesian coordinates in Å
    pub position: na::Point3<f64>,
}

impl LigandAnchor {
    /// Whether the anchor is one of the first-row transition metals (Sc to Zn).
    pub fn is_metal(&self) -> bool {
        let element = self.element.trim().to_uppercase();
        METALS.contains(&element.as_str())
    }
}

/// Which anchor the chosen surface atom is closest to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// The methionine SD atom
    Sulfur,
    /// The metal or ligand atom
    Ligand,
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorKind::Sulfur => write!(f, "SD"),
            AnchorKind::Ligand => write!(f, "MT"),
        }
    }
}

/// R-tree entry pointing back into [`SurfaceIndex::atoms`].
#[derive(Debug, Clone, Copy)]
struct SurfacePoint {
    index: usize,
    coords: [f64; 3],
}

impl RTreeObject for SurfacePoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for SurfacePoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.coords[0] - point[0];
        let dy = self.coords[1] - point[1];
        let dz = self.coords[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index over the solvent-exposed atoms of one structure entry.
pub struct SurfaceIndex {
    atoms: Vec<SurfaceAtom>,
    tree: RTree<SurfacePoint>,
}

impl SurfaceIndex {
    /// Build the index. Atom order decides ties.
    pub fn new(atoms: Vec<SurfaceAtom>) -> Self {
        let points = atoms
            .iter()
            .enumerate()
            .map(|(index, a)| SurfacePoint {
                index,
                coords: [a.position.x, a.position.y, a.position.z],
            })
            .collect();
        Self {
            atoms,
            tree: RTree::bulk_load(points),
        }
    }

    /// The indexed atoms, in input order.
    pub fn atoms(&self) -> &[SurfaceAtom] {
        &self.atoms
    }

    /// Whether there are no surface atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Index and squared distance of the atom closest to `point`.
    /// Equidistant atoms resolve to the one listed first.
    fn nearest(&self, point: &na::Point3<f64>) -> Option<(usize, f64)> {
        let query = [point.x, point.y, point.z];
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = candidates.next()?;
        let mut best = first.index;
        for (p, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            best = best.min(p.index);
        }
        Some((best, best_d2))
    }
}

/// The surface atom closest to either anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestSurface {
    /// The chosen surface atom
    pub atom: SurfaceAtom,
    /// The anchor the atom is closest to
    pub closest_to: AnchorKind,
    /// Distance from the atom to the anchor it is closest to
    pub distance: f64,
}

/// Find the surface atom minimizing the distance to either the sulfur or the ligand.
///
/// When both anchors are exactly as close to their nearest atom, the sulfur wins.
/// Returns `None` if there is no surface atom at all.
pub fn nearest_surface(
    sulfur: &na::Point3<f64>,
    ligand: &na::Point3<f64>,
    surface: &SurfaceIndex,
) -> Option<NearestSurface> {
    let (sd_idx, sd_d2) = surface.nearest(sulfur)?;
    let (mt_idx, mt_d2) = surface.nearest(ligand)?;

    let (index, d2, closest_to) = if sd_d2 <= mt_d2 {
        (sd_idx, sd_d2, AnchorKind::Sulfur)
    } else {
        (mt_idx, mt_d2, AnchorKind::Ligand)
    };
    Some(NearestSurface {
        atom: surface.atoms[index].clone(),
        closest_to,
        distance: d2.sqrt(),
    })
}

/// Side lengths and area of the SD / MT / SF triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Sulfur to ligand
    pub sd_mt: f64,
    /// Surface to ligand
    pub sf_mt: f64,
    /// Surface to sulfur
    pub sf_sd: f64,
    /// Half the magnitude of the cross product of two edges
    pub area: f64,
}

impl Triangle {
    /// Measure the triangle spanned by the sulfur, the ligand and the surface atom.
    pub fn new(sd: &na::Point3<f64>, mt: &na::Point3<f64>, sf: &na::Point3<f64>) -> Self {
        let u = mt - sd;
        let v = sf - sd;
        Self {
            sd_mt: u.norm(),
            sf_mt: (sf - mt).norm(),
            sf_sd: v.norm(),
            area: 0.5 * u.cross(&v).norm(),
        }
    }
}

/// Coarse bridge category used when comparing triangle geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleClass {
    /// Only PHE aromatics
    PhePhe,
    /// At least one PHE alongside another aromatic
    PheAro,
    /// No PHE at all
    AroAro,
}

impl TriangleClass {
    /// Classify a bridge by how many of its aromatics are PHE.
    pub fn from_bridge(bridge: &Bridge) -> Self {
        let phe = bridge
            .aromatics
            .iter()
            .filter(|r| r.kind == ResidueKind::Phe)
            .count();
        match phe {
            0 => Self::AroAro,
            n if n == bridge.aromatics.len() => Self::PhePhe,
            _ => Self::PheAro,
        }
    }
}

impl fmt::Display for TriangleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriangleClass::PhePhe => write!(f, "PHE-PHE"),
            TriangleClass::PheAro => write!(f, "PHE-ARO"),
            TriangleClass::AroAro => write!(f, "ARO-ARO"),
        }
    }
}

/// Derived geometry for one (bridge, ligand anchor) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleneRecord {
    /// Structure entry identifier
    pub code: String,
    /// The bridging methionine
    pub methionine: ResidueNode,
    /// The bridged aromatics, sorted
    pub aromatics: Vec<ResidueNode>,
    /// Canonical bridge label, e.g. `PHE-TRP`
    pub bridge_label: String,
    /// Coarse bridge category
    pub class: TriangleClass,
    /// Label of the metal or ligand anchor
    pub ligand: String,
    /// SD position
    pub sulfur: na::Point3<f64>,
    /// Metal or ligand position
    pub ligand_position: na::Point3<f64>,
    /// The chosen surface atom
    pub surface: SurfaceAtom,
    /// The anchor the surface atom is closest to
    pub closest_to: AnchorKind,
    /// Side lengths and area
    pub triangle: Triangle,
}

/// Measure the scalene triangle for every bridge and ligand anchor of one entry.
///
/// Bridges whose methionine has no recorded SD position are skipped, and an
/// empty surface yields no records.
pub fn scalene_records(
    code: &str,
    bridges: &[Bridge],
    sulfurs: &HashMap<ResidueNode, na::Point3<f64>>,
    ligands: &[LigandAnchor],
    surface: &SurfaceIndex,
) -> Vec<ScaleneRecord> {
    let mut records = Vec::new();
    for bridge in bridges {
        let Some(sulfur) = sulfurs.get(&bridge.methionine) else {
            trace!("{code}: no SD position for {}", bridge.methionine);
            continue;
        };
        for ligand in ligands {
            let Some(nearest) = nearest_surface(sulfur, &ligand.position, surface) else {
                continue;
            };
            let triangle = Triangle::new(sulfur, &ligand.position, &nearest.atom.position);
            records.push(ScaleneRecord {
                code: code.to_string(),
                methionine: bridge.methionine.clone(),
                aromatics: bridge.aromatics.clone(),
                bridge_label: bridge.label(),
                class: TriangleClass::from_bridge(bridge),
                ligand: ligand.label.clone(),
                sulfur: *sulfur,
                ligand_position: ligand.position,
                surface: nearest.atom,
                closest_to: nearest.closest_to,
                triangle,
            });
        }
    }
    records
}

/// Convert scalene records into a Polars `DataFrame`.
pub fn scalene_to_df(records: &[ScaleneRecord]) -> PolarsResult<DataFrame> {
    df!(
        "code" => records.iter().map(|r| r.code.clone()).collect::<Vec<String>>(),
        "met" => records.iter().map(|r| r.methionine.label()).collect::<Vec<String>>(),
        "aromatics" => records.iter().map(|r| r.aromatics.iter().map(|a| a.label()).collect::<Vec<_>>().join(",")).collect::<Vec<String>>(),
        "label" => records.iter().map(|r| r.bridge_label.clone()).collect::<Vec<String>>(),
        "class" => records.iter().map(|r| r.class.to_string()).collect::<Vec<String>>(),
        "ligand" => records.iter().map(|r| r.ligand.clone()).collect::<Vec<String>>(),
        "sf_chain" => records.iter().map(|r| r.surface.chain.clone()).collect::<Vec<String>>(),
        "sf_resi" => records.iter().map(|r| r.surface.resi).collect::<Vec<i64>>(),
        "sf_atomn" => records.iter().map(|r| r.surface.atomn.clone()).collect::<Vec<String>>(),
        "closest_to" => records.iter().map(|r| r.closest_to.to_string()).collect::<Vec<String>>(),
        "sd_mt" => records.iter().map(|r| r.triangle.sd_mt).collect::<Vec<f64>>(),
        "sf_mt" => records.iter().map(|r| r.triangle.sf_mt).collect::<Vec<f64>>(),
        "sf_sd" => records.iter().map(|r| r.triangle.sf_sd).collect::<Vec<f64>>(),
        "area" => records.iter().map(|r| r.triangle.area).collect::<Vec<f64>>(),
    )
}
