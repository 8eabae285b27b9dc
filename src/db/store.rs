use crate::model::atom::IdAllocator;
use crate::model::complete::CompleteMolecule;
use crate::model::stripped::StrippedMolecule;
use crate::model::structure::MoleculeStructure;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Read-only registry of named molecules and allowed structures.
///
/// Built once through [`MoleculeLibrary::load`] or [`MoleculeLibrary::from_sources`] and then
/// shared by reference with every kit. Nothing mutates it after construction, so it is `Sync`
/// and may be queried from several threads at once.
#[derive(Debug)]
pub struct MoleculeLibrary {
    pub(super) complete_molecules: Vec<CompleteMolecule>,
    pub(super) complete_by_name: HashMap<SmolStr, usize>,
    /// Full-histogram hash string to indices into `complete_molecules`.
    pub(super) complete_by_histogram: HashMap<String, Vec<usize>>,
    /// Stripped-histogram hash string to the allowed skeletons with that composition.
    pub(super) allowed_structures: HashMap<String, Vec<StrippedMolecule>>,
    pub(super) allowed_count: usize,
}

impl MoleculeLibrary {
    pub(super) fn empty() -> Self {
        Self {
            complete_molecules: Vec::new(),
            complete_by_name: HashMap::new(),
            complete_by_histogram: HashMap::new(),
            allowed_structures: HashMap::new(),
            allowed_count: 0,
        }
    }

    /// Every named molecule, in data-file order.
    pub fn complete_molecules(&self) -> &[CompleteMolecule] {
        &self.complete_molecules
    }

    /// Looks up a named molecule by its stored name (`hydrogen_peroxide`, not
    /// `hydrogen peroxide`).
    pub fn molecule_by_name(&self, name: &str) -> Option<&CompleteMolecule> {
        self.complete_by_name
            .get(name)
            .map(|index| &self.complete_molecules[*index])
    }

    /// Number of allowed skeletons, including those contributed by named molecules.
    pub fn allowed_structure_count(&self) -> usize {
        self.allowed_count
    }

    /// Returns the named molecule that `structure` is, if any.
    ///
    /// Invalid structures (cycles, disconnected pieces, overbonded hydrogens) never match.
    pub fn find_matching_complete_molecule(&self, structure: &MoleculeStructure) -> Option<&CompleteMolecule> {
        if !structure.is_valid() {
            return None;
        }
        self.complete_by_histogram
            .get(&structure.histogram().hash_string())?
            .iter()
            .map(|index| &self.complete_molecules[*index])
            .find(|molecule| molecule.structure().is_equivalent(structure))
    }

    /// Decides whether `structure` is a known molecule or a hydrogen-depleted fragment of one.
    ///
    /// Structures with no heavy atoms are allowed only up to two atoms (H and H2).
    pub fn is_allowed_structure(&self, structure: &MoleculeStructure) -> bool {
        if !structure.is_valid() {
            return false;
        }
        // The skeleton is a throwaway; its id never escapes this call.
        let mut scratch = IdAllocator::new();
        let Ok(stripped) = StrippedMolecule::new(structure, &mut scratch) else {
            return false;
        };
        if stripped.heavy_atom_count() == 0 {
            return structure.atom_count() <= 2;
        }
        self.allowed_structures
            .get(&stripped.stripped().histogram().hash_string())
            .is_some_and(|candidates| {
                candidates
                    .iter()
                    .any(|allowed| stripped.is_hydrogen_submolecule(allowed))
            })
    }

    pub(super) fn register_complete(&mut self, molecule: CompleteMolecule) {
        let index = self.complete_molecules.len();
        self.complete_by_name
            .insert(SmolStr::new(molecule.common_name()), index);
        self.complete_by_histogram
            .entry(molecule.structure().histogram().hash_string())
            .or_default()
            .push(index);
        self.complete_molecules.push(molecule);
    }

    pub(super) fn register_allowed(&mut self, stripped: StrippedMolecule) {
        self.allowed_structures
            .entry(stripped.stripped().histogram().hash_string())
            .or_default()
            .push(stripped);
        self.allowed_count += 1;
    }
}
