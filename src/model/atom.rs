//! Atom identity and the id allocators that hand out atom and molecule identifiers.
//!
//! Atoms are value types: an [`Atom`] is just a stable [`AtomId`] paired with its
//! [`Element`]. Equality and hashing only consider the id, so the same atom can be copied into
//! several structures (the live structure, a hypothetical combined structure, a stripped view)
//! and still compare equal everywhere. Coordinates live with whoever owns the geometry (the
//! kit or a reference molecule), never on the atom itself.

use super::types::Element;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identifier of an atom within one id space (a kit or a library).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub u32);

/// Identifier assigned to every [`MoleculeStructure`](super::structure::MoleculeStructure)
/// at construction. Only used for bookkeeping and ordering, never for chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeId(pub u32);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Monotonic id source owned by a kit or a library.
///
/// Ids are never reused for a different logical atom or molecule. Cloning an allocator gives
/// an independent scratch copy, which is how hypothetical structures get ids without
/// consuming real ones.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_atom: u32,
    next_molecule: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_atom_id(&mut self) -> AtomId {
        let id = AtomId(self.next_atom);
        self.next_atom += 1;
        id
    }

    pub fn next_molecule_id(&mut self) -> MoleculeId {
        let id = MoleculeId(self.next_molecule);
        self.next_molecule += 1;
        id
    }

    /// Creates a new atom of the given element with a fresh id.
    pub fn new_atom(&mut self, element: Element) -> Atom {
        Atom::new(self.next_atom_id(), element)
    }
}

/// An atom as seen by the structure model: identity plus element.
#[derive(Debug, Clone, Copy)]
pub struct Atom {
    /// Unique id within the owning id space.
    pub id: AtomId,
    /// Chemical identity; never changes after creation.
    pub element: Element,
}

impl Atom {
    pub fn new(id: AtomId, element: Element) -> Self {
        Self { id, element }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }

    pub fn has_same_element(&self, other: &Atom) -> bool {
        self.element == other.element
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom {{ id: {}, element: {} }}", self.id, self.element)
    }
}
