//! Four-slot bond lattice that keeps kit-built molecules drawable.
//!
//! Every atom in play exposes one bond slot per [`Direction`]. Bonding through a slot fixes the
//! neighbor one lattice step away, so each molecule embeds in the integer grid. A bond is only
//! allowed when the two molecules, embedded on either side of it, do not put two atoms on the
//! same cell (hydrogens may share, since they never branch).

use super::atom::{Atom, AtomId};
use super::error::Error;
use super::types::Direction;
use std::collections::HashMap;

type Cell = (i32, i32);

/// Slot record of one registered atom.
#[derive(Debug, Clone)]
struct LewisDotAtom {
    atom: Atom,
    connections: [Option<AtomId>; 4],
}

impl LewisDotAtom {
    fn new(atom: Atom) -> Self {
        Self {
            atom,
            connections: [None; 4],
        }
    }

    fn connection(&self, direction: Direction) -> Option<AtomId> {
        self.connections[direction.slot()]
    }

    fn has_connection(&self, direction: Direction) -> bool {
        self.connection(direction).is_some()
    }
}

/// Directional bond occupancy of every atom in a kit.
///
/// If atom A's slot in direction D holds B, then B's slot in `D.opposite()` holds A.
#[derive(Debug, Clone, Default)]
pub struct LewisDotModel {
    atoms: HashMap<AtomId, LewisDotAtom>,
}

impl LewisDotModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an atom with all four slots empty. Re-registering keeps existing slots.
    pub fn add_atom(&mut self, atom: &Atom) {
        self.atoms
            .entry(atom.id)
            .or_insert_with(|| LewisDotAtom::new(*atom));
    }

    /// Breaks every bond of `atom` and forgets it.
    pub fn remove_atom(&mut self, atom: &Atom) -> Result<(), Error> {
        self.break_bonds_of_atom(atom)?;
        self.atoms.remove(&atom.id);
        Ok(())
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.atoms.contains_key(&atom.id)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn clear(&mut self) {
        self.atoms.clear();
    }

    /// Atom occupying the slot of `atom` in `direction`.
    pub fn neighbor(&self, atom: &Atom, direction: Direction) -> Option<Atom> {
        let id = self.atoms.get(&atom.id)?.connection(direction)?;
        self.atoms.get(&id).map(|entry| entry.atom)
    }

    /// Connects `a` to `b` through `direction` (and `b` to `a` through the opposite slot).
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownAtom`] if either atom was never registered.
    /// * [`Error::SlotOccupied`] if either slot already holds a bond.
    pub fn bond(&mut self, a: &Atom, direction: Direction, b: &Atom) -> Result<(), Error> {
        let opposite = direction.opposite();
        let a_entry = self.entry(a)?;
        if a_entry.has_connection(direction) {
            return Err(Error::SlotOccupied {
                atom: a.id,
                direction,
            });
        }
        let b_entry = self.entry(b)?;
        if b_entry.has_connection(opposite) {
            return Err(Error::SlotOccupied {
                atom: b.id,
                direction: opposite,
            });
        }

        self.entry_mut(a)?.connections[direction.slot()] = Some(b.id);
        self.entry_mut(b)?.connections[opposite.slot()] = Some(a.id);
        Ok(())
    }

    /// Clears the bond between `a` and `b` on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BondNotFound`] when the atoms are not directly connected.
    pub fn break_bond(&mut self, a: &Atom, b: &Atom) -> Result<(), Error> {
        let direction = self
            .direction_between(a, b)
            .ok_or(Error::BondNotFound { a: a.id, b: b.id })?;
        self.entry_mut(a)?.connections[direction.slot()] = None;
        self.entry_mut(b)?.connections[direction.opposite().slot()] = None;
        Ok(())
    }

    /// Breaks every bond of `atom`, leaving all four slots empty.
    pub fn break_bonds_of_atom(&mut self, atom: &Atom) -> Result<(), Error> {
        let connections = self.entry(atom)?.connections;
        for (slot, connection) in connections.iter().enumerate() {
            let Some(other_id) = connection else {
                continue;
            };
            let direction = Direction::ALL[slot];
            if let Some(other) = self.atoms.get_mut(other_id) {
                other.connections[direction.opposite().slot()] = None;
            }
        }
        self.entry_mut(atom)?.connections = [None; 4];
        Ok(())
    }

    /// Slots of `atom` that hold no bond, in North/East/South/West order.
    ///
    /// An unregistered atom has no open slots.
    pub fn open_directions(&self, atom: &Atom) -> Vec<Direction> {
        let Some(entry) = self.atoms.get(&atom.id) else {
            return Vec::new();
        };
        Direction::ALL
            .into_iter()
            .filter(|direction| !entry.has_connection(*direction))
            .collect()
    }

    /// Direction from `a` to `b`, if they are directly bonded.
    pub fn direction_between(&self, a: &Atom, b: &Atom) -> Option<Direction> {
        let entry = self.atoms.get(&a.id)?;
        Direction::ALL
            .into_iter()
            .find(|direction| entry.connection(*direction) == Some(b.id))
    }

    /// Checks whether bonding `b` onto `a` in `direction` keeps the combined molecule on the
    /// lattice without two atoms sharing a cell.
    ///
    /// `a`'s molecule is laid out from the origin and `b`'s molecule from one step in
    /// `direction`. Only hydrogens may overlap. Unregistered atoms never allow a bond.
    pub fn will_allow_bond(&self, a: &Atom, direction: Direction, b: &Atom) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let mut lattice: HashMap<Cell, Atom> = HashMap::new();
        self.map_molecule(a, (0, 0), None, &mut lattice)
            && self.map_molecule(b, direction.offset(), None, &mut lattice)
    }

    /// Places `atom` at `cell` and recurses through its bonds, skipping the edge back to
    /// `parent`. Returns `false` on the first disallowed overlap.
    fn map_molecule(
        &self,
        atom: &Atom,
        cell: Cell,
        parent: Option<AtomId>,
        lattice: &mut HashMap<Cell, Atom>,
    ) -> bool {
        if let Some(existing) = lattice.get(&cell) {
            if *existing != *atom && !(existing.is_hydrogen() && atom.is_hydrogen()) {
                return false;
            }
        } else {
            lattice.insert(cell, *atom);
        }

        let Some(entry) = self.atoms.get(&atom.id) else {
            return true;
        };
        for direction in Direction::ALL {
            let Some(next_id) = entry.connection(direction) else {
                continue;
            };
            if Some(next_id) == parent {
                continue;
            }
            let Some(next) = self.atoms.get(&next_id) else {
                continue;
            };
            let (dx, dy) = direction.offset();
            if !self.map_molecule(&next.atom, (cell.0 + dx, cell.1 + dy), Some(atom.id), lattice) {
                return false;
            }
        }
        true
    }

    fn entry(&self, atom: &Atom) -> Result<&LewisDotAtom, Error> {
        self.atoms
            .get(&atom.id)
            .ok_or(Error::UnknownAtom { atom: atom.id })
    }

    fn entry_mut(&mut self, atom: &Atom) -> Result<&mut LewisDotAtom, Error> {
        self.atoms
            .get_mut(&atom.id)
            .ok_or(Error::UnknownAtom { atom: atom.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::IdAllocator;
    use crate::model::types::Element;

    fn register(model: &mut LewisDotModel, ids: &mut IdAllocator, element: Element) -> Atom {
        let atom = ids.new_atom(element);
        model.add_atom(&atom);
        atom
    }

    fn assert_symmetric(model: &LewisDotModel) {
        for entry in model.atoms.values() {
            for direction in Direction::ALL {
                if let Some(other) = entry.connection(direction) {
                    assert_eq!(
                        model.atoms[&other].connection(direction.opposite()),
                        Some(entry.atom.id)
                    );
                }
            }
        }
    }

    #[test]
    fn new_atoms_have_four_open_slots() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let atom = register(&mut model, &mut ids, Element::C);

        assert_eq!(model.open_directions(&atom), Direction::ALL.to_vec());
    }

    #[test]
    fn bond_fills_opposite_slots() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let o = register(&mut model, &mut ids, Element::O);
        let h = register(&mut model, &mut ids, Element::H);

        model.bond(&o, Direction::East, &h).unwrap();

        assert_eq!(model.direction_between(&o, &h), Some(Direction::East));
        assert_eq!(model.direction_between(&h, &o), Some(Direction::West));
        assert_eq!(model.neighbor(&o, Direction::East), Some(h));
        assert!(!model.open_directions(&o).contains(&Direction::East));
        assert!(!model.open_directions(&h).contains(&Direction::West));
        assert_symmetric(&model);
    }

    #[test]
    fn bond_rejects_occupied_slots_and_unknown_atoms() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let o = register(&mut model, &mut ids, Element::O);
        let h1 = register(&mut model, &mut ids, Element::H);
        let h2 = register(&mut model, &mut ids, Element::H);
        let stranger = ids.new_atom(Element::N);

        model.bond(&o, Direction::East, &h1).unwrap();

        assert!(matches!(
            model.bond(&o, Direction::East, &h2),
            Err(Error::SlotOccupied { direction: Direction::East, .. })
        ));
        assert!(matches!(
            model.bond(&h2, Direction::South, &stranger),
            Err(Error::UnknownAtom { .. })
        ));
        assert_symmetric(&model);
    }

    #[test]
    fn break_bond_clears_both_sides() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let o = register(&mut model, &mut ids, Element::O);
        let h = register(&mut model, &mut ids, Element::H);
        model.bond(&o, Direction::North, &h).unwrap();

        model.break_bond(&h, &o).unwrap();

        assert_eq!(model.open_directions(&o).len(), 4);
        assert_eq!(model.open_directions(&h).len(), 4);
        assert!(matches!(model.break_bond(&o, &h), Err(Error::BondNotFound { .. })));
    }

    #[test]
    fn break_bonds_of_atom_frees_every_neighbor() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let c = register(&mut model, &mut ids, Element::C);
        let neighbors: Vec<Atom> = (0..4).map(|_| register(&mut model, &mut ids, Element::H)).collect();
        for (direction, h) in Direction::ALL.into_iter().zip(&neighbors) {
            model.bond(&c, direction, h).unwrap();
        }
        assert!(model.open_directions(&c).is_empty());

        model.break_bonds_of_atom(&c).unwrap();

        assert_eq!(model.open_directions(&c).len(), 4);
        for h in &neighbors {
            assert_eq!(model.open_directions(h).len(), 4);
        }
        assert_symmetric(&model);
    }

    #[test]
    fn remove_atom_forgets_it_and_frees_neighbors() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let o = register(&mut model, &mut ids, Element::O);
        let h = register(&mut model, &mut ids, Element::H);
        model.bond(&o, Direction::West, &h).unwrap();

        model.remove_atom(&o).unwrap();

        assert!(!model.contains(&o));
        assert_eq!(model.open_directions(&h).len(), 4);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn will_allow_bond_between_free_atoms() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let a = register(&mut model, &mut ids, Element::O);
        let b = register(&mut model, &mut ids, Element::O);

        for direction in Direction::ALL {
            assert!(model.will_allow_bond(&a, direction, &b));
        }
    }

    /// Builds an "L" of heavy atoms: `corner` with `east` to its East and `north` to its North,
    /// so a fourth atom placed diagonally collides when bonded back into the corner.
    fn corner_with_two_arms(
        model: &mut LewisDotModel,
        ids: &mut IdAllocator,
        arm: Element,
    ) -> (Atom, Atom, Atom) {
        let corner = register(model, ids, Element::C);
        let east = register(model, ids, arm);
        let north = register(model, ids, arm);
        model.bond(&corner, Direction::East, &east).unwrap();
        model.bond(&corner, Direction::North, &north).unwrap();
        (corner, east, north)
    }

    #[test]
    fn overlapping_heavy_atoms_are_rejected() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let (_, east, _) = corner_with_two_arms(&mut model, &mut ids, Element::O);

        // Two-oxygen chain with its tail to the West.
        let x = register(&mut model, &mut ids, Element::O);
        let y = register(&mut model, &mut ids, Element::O);
        model.bond(&x, Direction::West, &y).unwrap();

        // `x` at (1,1) north of `east`, `y` at (0,1) which is the `north` arm's cell.
        assert!(!model.will_allow_bond(&east, Direction::North, &x));
        // Bonding `x` East of `east` puts it at (2,0) and `y` at (1,0) which is `east` itself.
        assert!(!model.will_allow_bond(&east, Direction::East, &x));
        // South of `east`: `x` at (1,-1), `y` at (0,-1); both free.
        assert!(model.will_allow_bond(&east, Direction::South, &x));
    }

    #[test]
    fn overlapping_hydrogens_are_allowed() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let (_, east, _) = corner_with_two_arms(&mut model, &mut ids, Element::H);

        // Same layout as the heavy case, but the colliding pair is two hydrogens.
        let x = register(&mut model, &mut ids, Element::O);
        let h = register(&mut model, &mut ids, Element::H);
        model.bond(&x, Direction::West, &h).unwrap();

        let mut heavy_ids = IdAllocator::new();
        let mut heavy_model = LewisDotModel::new();
        let (_, heavy_east, _) = corner_with_two_arms(&mut heavy_model, &mut heavy_ids, Element::O);
        let heavy_x = register(&mut heavy_model, &mut heavy_ids, Element::O);
        let heavy_tail = register(&mut heavy_model, &mut heavy_ids, Element::O);
        heavy_model.bond(&heavy_x, Direction::West, &heavy_tail).unwrap();

        assert!(model.will_allow_bond(&east, Direction::North, &x));
        assert!(!heavy_model.will_allow_bond(&heavy_east, Direction::North, &heavy_x));
    }

    #[test]
    fn unregistered_atoms_never_allow_bonds() {
        let mut ids = IdAllocator::new();
        let mut model = LewisDotModel::new();
        let a = register(&mut model, &mut ids, Element::C);
        let stranger = ids.new_atom(Element::C);

        assert!(!model.will_allow_bond(&a, Direction::North, &stranger));
        assert!(model.open_directions(&stranger).is_empty());
    }
}
