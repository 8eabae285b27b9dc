//! Named reference molecules from the bundled collection.

use super::atom::{Atom, AtomId};
use super::structure::MoleculeStructure;
use super::types::Point;
use nalgebra::Point3;
use smol_str::SmolStr;

/// Reference layout of one atom: flat 2D diagram position and 3D model position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomCoordinates {
    pub pos_2d: Point,
    pub pos_3d: Point3<f64>,
}

/// A known molecule the kit can recognize.
///
/// Coordinates are aligned index-for-index with the structure's atoms.
#[derive(Debug, Clone)]
pub struct CompleteMolecule {
    common_name: SmolStr,
    molecular_formula: SmolStr,
    cid: u64,
    structure: MoleculeStructure,
    coordinates: Vec<AtomCoordinates>,
}

impl CompleteMolecule {
    pub fn new(
        common_name: impl Into<SmolStr>,
        molecular_formula: impl Into<SmolStr>,
        cid: u64,
        structure: MoleculeStructure,
        coordinates: Vec<AtomCoordinates>,
    ) -> Self {
        debug_assert_eq!(structure.atom_count(), coordinates.len());
        Self {
            common_name: common_name.into(),
            molecular_formula: molecular_formula.into(),
            cid,
            structure,
            coordinates,
        }
    }

    /// Name as stored in the collection (underscores for spaces).
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// Human-readable name.
    pub fn display_name(&self) -> String {
        self.common_name.replace('_', " ")
    }

    /// Formula as recorded in the collection, which may differ from
    /// [`MoleculeStructure::general_formula`] for ions and conventional spellings.
    pub fn molecular_formula(&self) -> &str {
        &self.molecular_formula
    }

    /// PubChem compound id.
    pub fn cid(&self) -> u64 {
        self.cid
    }

    pub fn structure(&self) -> &MoleculeStructure {
        &self.structure
    }

    pub fn coordinates(&self) -> &[AtomCoordinates] {
        &self.coordinates
    }

    pub fn coordinates_of(&self, id: AtomId) -> Option<&AtomCoordinates> {
        self.structure
            .atoms()
            .iter()
            .position(|atom| atom.id == id)
            .map(|index| &self.coordinates[index])
    }

    /// Atoms paired with their reference coordinates.
    pub fn atoms_with_coordinates(&self) -> impl Iterator<Item = (&Atom, &AtomCoordinates)> {
        self.structure.atoms().iter().zip(self.coordinates.iter())
    }
}
