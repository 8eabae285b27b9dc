use super::error::Error;
use super::parser;
use super::store::MoleculeLibrary;
use crate::model::atom::IdAllocator;
use crate::model::stripped::StrippedMolecule;

const COMPLETE_SOURCE: &str = "collection-molecules.txt";
const ALLOWED_SOURCE: &str = "allowed-structures.txt";

const COMPLETE_DATA: &str = include_str!("../../data/collection-molecules.txt");
const ALLOWED_DATA: &str = include_str!("../../data/allowed-structures.txt");

impl MoleculeLibrary {
    /// Loads the reference data bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] naming the first offending record if the bundled data is corrupt.
    pub fn load() -> Result<Self, Error> {
        Self::from_sources(COMPLETE_DATA, ALLOWED_DATA)
    }

    /// Builds a library from the text of a complete-molecule file and an allowed-structure
    /// file.
    ///
    /// Every named molecule is also registered as an allowed structure. Records that are not
    /// valid trees (overbonded hydrogens, loops, disconnected atoms) abort the load.
    ///
    /// # Arguments
    ///
    /// * `complete_molecules` - Contents in the `collection-molecules.txt` format.
    /// * `allowed_structures` - Contents in the `allowed-structures.txt` format.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] for the first record that fails to parse or validate.
    pub fn from_sources(complete_molecules: &str, allowed_structures: &str) -> Result<Self, Error> {
        let mut ids = IdAllocator::new();
        let mut library = MoleculeLibrary::empty();

        for (line_no, molecule) in parser::parse_complete_molecules(COMPLETE_SOURCE, complete_molecules, &mut ids)? {
            if library.molecule_by_name(molecule.common_name()).is_some() {
                return Err(Error::DuplicateName {
                    source_name: COMPLETE_SOURCE.to_string(),
                    line: line_no,
                    name: molecule.common_name().to_string(),
                });
            }
            let stripped = StrippedMolecule::new(molecule.structure(), &mut ids)
                .map_err(|e| Error::structure(COMPLETE_SOURCE, line_no, e))?;
            library.register_allowed(stripped);
            library.register_complete(molecule);
        }

        for (line_no, structure) in parser::parse_allowed_structures(ALLOWED_SOURCE, allowed_structures)? {
            let structure = structure.renumbered(&mut ids);
            if structure.has_weird_hydrogen_properties() {
                return Err(Error::malformed(
                    ALLOWED_SOURCE,
                    line_no,
                    "hydrogen bonded to more than one atom",
                ));
            }
            if structure.has_loops_or_is_disconnected() {
                return Err(Error::malformed(
                    ALLOWED_SOURCE,
                    line_no,
                    "structure contains a loop or is disconnected",
                ));
            }
            let stripped = StrippedMolecule::new(&structure, &mut ids)
                .map_err(|e| Error::structure(ALLOWED_SOURCE, line_no, e))?;
            library.register_allowed(stripped);
        }

        log::info!(
            "Loaded {} complete molecules and {} allowed structures",
            library.complete_molecules().len(),
            library.allowed_structure_count()
        );
        Ok(library)
    }
}
