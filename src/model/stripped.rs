//! Hydrogen-stripped canonical form of a structure.
//!
//! Hydrogens never branch, so a molecule is fully described by its heavy-atom skeleton plus the
//! number of hydrogens hanging off each heavy atom. Comparing skeletons is far cheaper than
//! comparing the full graphs, and relaxing the per-atom hydrogen counts to "at most" lets one
//! reference structure validate every partially hydrogenated fragment of itself.

use super::atom::{Atom, IdAllocator};
use super::error::Error;
use super::matching;
use super::structure::MoleculeStructure;
use std::collections::HashMap;

/// Heavy-atom skeleton of a structure with per-atom hydrogen counts.
#[derive(Debug, Clone)]
pub struct StrippedMolecule {
    stripped: MoleculeStructure,
    hydrogen_count: Vec<usize>,
    total_hydrogens: usize,
}

impl StrippedMolecule {
    /// Strips every hydrogen out of `original`.
    ///
    /// Heavy atoms keep their original relative order and ids. The skeleton takes a fresh id
    /// from `ids` so it never collides with the structure it was derived from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeirdHydrogen`] if a hydrogen is bonded to two or more atoms.
    pub fn new(original: &MoleculeStructure, ids: &mut IdAllocator) -> Result<Self, Error> {
        if let Some((hydrogen, neighbors)) = original.overbonded_hydrogen() {
            return Err(Error::WeirdHydrogen {
                atom: hydrogen.id,
                neighbors,
            });
        }

        let mut stripped = MoleculeStructure::with_capacity(
            ids.next_molecule_id(),
            original.heavy_atom_count(),
            original.bond_count(),
        );
        let mut slots: HashMap<Atom, usize> = HashMap::new();
        for atom in original.atoms().iter().filter(|a| !a.is_hydrogen()) {
            slots.insert(*atom, stripped.atom_count());
            stripped.add_atom(*atom)?;
        }

        let mut hydrogen_count = vec![0; stripped.atom_count()];
        for bond in original.bonds() {
            match (bond.a.is_hydrogen(), bond.b.is_hydrogen()) {
                (false, false) => stripped.add_bond_with_order(&bond.a, &bond.b, bond.order)?,
                (true, false) => hydrogen_count[slots[&bond.b]] += 1,
                (false, true) => hydrogen_count[slots[&bond.a]] += 1,
                // Only H2 has a hydrogen-hydrogen bond, and it has no skeleton to attach to.
                (true, true) => {}
            }
        }

        let total_hydrogens = original.atom_count() - stripped.atom_count();
        Ok(Self {
            stripped,
            hydrogen_count,
            total_hydrogens,
        })
    }

    /// The heavy-atom skeleton.
    pub fn stripped(&self) -> &MoleculeStructure {
        &self.stripped
    }

    /// Hydrogen counts aligned index-for-index with [`StrippedMolecule::stripped`] atoms.
    pub fn hydrogen_counts(&self) -> &[usize] {
        &self.hydrogen_count
    }

    pub fn hydrogen_count(&self, atom: &Atom) -> Option<usize> {
        self.stripped
            .index_of(atom)
            .map(|index| self.hydrogen_count[index])
    }

    /// All hydrogens of the source structure, bonded or not.
    pub fn total_hydrogens(&self) -> usize {
        self.total_hydrogens
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.stripped.atom_count()
    }

    /// Atom count of the structure this was stripped from.
    pub fn source_atom_count(&self) -> usize {
        self.heavy_atom_count() + self.total_hydrogens
    }

    /// Same skeleton with exactly the same hydrogen count on every matched atom.
    pub fn is_equivalent(&self, other: &StrippedMolecule) -> bool {
        if self.heavy_atom_count() == 0 || other.heavy_atom_count() == 0 {
            return self.heavy_atom_count() == other.heavy_atom_count()
                && self.total_hydrogens == other.total_hydrogens;
        }
        if self.stripped.histogram() != other.stripped.histogram() {
            return false;
        }
        matching::is_isomorphic(&self.stripped, &other.stripped, |mine, theirs| {
            mine.has_same_element(theirs) && self.hydrogens_of(mine) == other.hydrogens_of(theirs)
        })
    }

    /// Same skeleton where `other` carries at least as many hydrogens on every matched atom.
    ///
    /// A hydrogen-free skeleton is only a submolecule when the source itself is tiny (H or
    /// H2): there is nothing heavy to anchor the hydrogens to.
    pub fn is_hydrogen_submolecule(&self, other: &StrippedMolecule) -> bool {
        if self.heavy_atom_count() == 0 {
            return self.source_atom_count() <= 2;
        }
        if self.stripped.histogram() != other.stripped.histogram() {
            return false;
        }
        matching::is_isomorphic(&self.stripped, &other.stripped, |mine, theirs| {
            mine.has_same_element(theirs) && self.hydrogens_of(mine) <= other.hydrogens_of(theirs)
        })
    }

    fn hydrogens_of(&self, atom: &Atom) -> usize {
        self.hydrogen_count(atom).unwrap_or_default()
    }
}
