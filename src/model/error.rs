//! Errors raised by the structure model when an operation would break a graph invariant.
//!
//! These are modeling bugs upstream (duplicate atoms, bonds to strangers, bonding a molecule
//! to itself), not user mistakes; chemistry-validity rejections are plain `false` returns.

use super::atom::{AtomId, MoleculeId};
use super::types::Direction;
use thiserror::Error;

/// Structural-invariant violations raised by the model layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The atom is already a member of the structure.
    #[error("atom {atom} is already part of molecule {molecule}")]
    DuplicateAtom { molecule: MoleculeId, atom: AtomId },

    /// A bond references a non-member, joins an atom to itself, or repeats an existing pair.
    #[error("invalid bond {a}-{b} in molecule {molecule}: {reason}")]
    InvalidBond {
        molecule: MoleculeId,
        a: AtomId,
        b: AtomId,
        reason: &'static str,
    },

    /// No bond connects the two atoms.
    #[error("no bond between atoms {a} and {b}")]
    BondNotFound { a: AtomId, b: AtomId },

    /// Both atoms already belong to the same molecule; bonding them would close a loop.
    #[error("atoms {a} and {b} already belong to molecule {molecule}")]
    SameMolecule {
        molecule: MoleculeId,
        a: AtomId,
        b: AtomId,
    },

    /// A hydrogen is bonded to more than one atom.
    #[error("hydrogen {atom} is bonded to {neighbors} atoms")]
    WeirdHydrogen { atom: AtomId, neighbors: usize },

    /// The atom was never registered with the Lewis-dot model.
    #[error("atom {atom} is not registered in the Lewis-dot model")]
    UnknownAtom { atom: AtomId },

    /// The requested bond slot is already taken.
    #[error("the {direction} slot of atom {atom} is already occupied")]
    SlotOccupied { atom: AtomId, direction: Direction },

    /// A serialized structure could not be decoded.
    #[error("malformed structure '{input}': {details}")]
    Parse { input: String, details: String },
}

impl Error {
    /// Helper for constructing an [`Error::InvalidBond`] variant.
    pub fn invalid_bond(molecule: MoleculeId, a: AtomId, b: AtomId, reason: &'static str) -> Self {
        Self::InvalidBond {
            molecule,
            a,
            b,
            reason,
        }
    }

    /// Helper for constructing an [`Error::Parse`] variant.
    pub fn parse(input: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            details: details.into(),
        }
    }
}
