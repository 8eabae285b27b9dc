use crate::model::atom::{AtomId, MoleculeId};
use crate::model::error::Error as ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("atom {atom} does not belong to this kit")]
    UnknownAtom { atom: AtomId },

    #[error("molecule {molecule} is not live in this kit")]
    UnknownMolecule { molecule: MoleculeId },

    #[error("atom {atom} is already in play")]
    AtomInPlay { atom: AtomId },

    #[error("atom {atom} is still in its bucket")]
    AtomNotInPlay { atom: AtomId },

    #[error(transparent)]
    Model(#[from] ModelError),
}
