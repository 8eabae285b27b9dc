//! Generic atom/bond graph describing one molecule (or molecule fragment).
//!
//! A [`MoleculeStructure`] is the unit the kit juggles: every atom in play belongs to exactly
//! one structure, bonding two atoms merges their structures, and breaking a bond splits one
//! structure into two. Structures are rebuilt rather than mutated by those surgeries, so an id
//! always refers to the same logical molecule.

use super::atom::{Atom, AtomId, IdAllocator, MoleculeId};
use super::error::Error;
use super::histogram::ElementHistogram;
use super::matching;
use super::types::{BondOrder, Element};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write;

/// Formula strings that read better in their conventional form.
const FORMULA_EXCEPTIONS: &[(&str, &str)] = &[("H3N", "NH3"), ("CHN", "HCN")];

/// Bond between two member atoms.
///
/// Storage keeps the endpoints in insertion order, but equality is symmetric: `(a, b)` equals
/// `(b, a)` regardless of the bond order.
#[derive(Debug, Clone, Copy)]
pub struct Bond {
    pub a: Atom,
    pub b: Atom,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(a: Atom, b: Atom, order: BondOrder) -> Self {
        debug_assert!(a != b, "Bond endpoints must differ");
        Self { a, b, order }
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.a == *atom || self.b == *atom
    }

    /// Returns the endpoint opposite to `atom`, or `None` if `atom` is not an endpoint.
    pub fn other_atom(&self, atom: &Atom) -> Option<Atom> {
        if self.a == *atom {
            Some(self.b)
        } else if self.b == *atom {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn connects(&self, x: &Atom, y: &Atom) -> bool {
        (self.a == *x && self.b == *y) || (self.a == *y && self.b == *x)
    }
}

impl PartialEq for Bond {
    fn eq(&self, other: &Self) -> bool {
        self.connects(&other.a, &other.b)
    }
}

impl Eq for Bond {}

/// Ordered atoms and bonds of a molecule, plus its bookkeeping id.
///
/// Atom insertion order is significant: stripped views and serialized forms index atoms by
/// position.
#[derive(Debug, Clone)]
pub struct MoleculeStructure {
    id: MoleculeId,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl MoleculeStructure {
    pub fn new(id: MoleculeId) -> Self {
        Self {
            id,
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    pub fn with_capacity(id: MoleculeId, atoms: usize, bonds: usize) -> Self {
        Self {
            id,
            atoms: Vec::with_capacity(atoms),
            bonds: Vec::with_capacity(bonds),
        }
    }

    /// Builds a one-atom structure.
    pub fn single(id: MoleculeId, atom: Atom) -> Self {
        Self {
            id,
            atoms: vec![atom],
            bonds: Vec::new(),
        }
    }

    pub fn id(&self) -> MoleculeId {
        self.id
    }

    /// Copy with fresh atom and molecule ids drawn from `ids`; atom and bond order are kept.
    pub(crate) fn renumbered(&self, ids: &mut IdAllocator) -> MoleculeStructure {
        let mapping: HashMap<AtomId, Atom> = self
            .atoms
            .iter()
            .map(|atom| (atom.id, ids.new_atom(atom.element)))
            .collect();
        MoleculeStructure {
            id: ids.next_molecule_id(),
            atoms: self.atoms.iter().map(|atom| mapping[&atom.id]).collect(),
            bonds: self
                .bonds
                .iter()
                .map(|bond| Bond::new(mapping[&bond.a.id], mapping[&bond.b.id], bond.order))
                .collect(),
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains_atom(&self, atom: &Atom) -> bool {
        self.atoms.contains(atom)
    }

    pub fn atom_by_id(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.id == id)
    }

    /// Position of `atom` in the atom sequence.
    pub fn index_of(&self, atom: &Atom) -> Option<usize> {
        self.atoms.iter().position(|a| a == atom)
    }

    /// Appends an atom.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateAtom`] if the atom is already a member.
    pub fn add_atom(&mut self, atom: Atom) -> Result<(), Error> {
        if self.contains_atom(&atom) {
            return Err(Error::DuplicateAtom {
                molecule: self.id,
                atom: atom.id,
            });
        }
        self.atoms.push(atom);
        Ok(())
    }

    /// Appends a single bond between two member atoms.
    pub fn add_bond(&mut self, a: &Atom, b: &Atom) -> Result<(), Error> {
        self.add_bond_with_order(a, b, BondOrder::Single)
    }

    /// Appends a bond of the given order between two member atoms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBond`] when an endpoint is not a member, the endpoints are the
    /// same atom, or the pair is already bonded.
    pub fn add_bond_with_order(&mut self, a: &Atom, b: &Atom, order: BondOrder) -> Result<(), Error> {
        if a == b {
            return Err(Error::invalid_bond(self.id, a.id, b.id, "an atom cannot bond to itself"));
        }
        if !self.contains_atom(a) || !self.contains_atom(b) {
            return Err(Error::invalid_bond(self.id, a.id, b.id, "endpoint is not a member"));
        }
        if self.bond_between(a, b).is_some() {
            return Err(Error::invalid_bond(self.id, a.id, b.id, "atoms are already bonded"));
        }
        self.bonds.push(Bond::new(*a, *b, order));
        Ok(())
    }

    pub fn bonds_involving<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = &'a Bond> + 'a {
        self.bonds.iter().filter(move |bond| bond.contains(atom))
    }

    pub fn neighbors<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = Atom> + 'a {
        self.bonds_involving(atom)
            .filter_map(move |bond| bond.other_atom(atom))
    }

    pub fn bond_between(&self, a: &Atom, b: &Atom) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.connects(a, b))
    }

    pub fn histogram(&self) -> ElementHistogram {
        ElementHistogram::of(self)
    }

    pub fn contains_element(&self, element: Element) -> bool {
        self.atoms.iter().any(|a| a.element == element)
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.element.is_heavy_atom()).count()
    }

    /// Sum of standard atomic weights; used to decide who yields during separation.
    pub fn approximate_molecular_weight(&self) -> f64 {
        self.atoms.iter().map(|a| a.element.atomic_weight()).sum()
    }

    /// `true` when no hydrogen is overbonded and the graph is a single tree.
    pub fn is_valid(&self) -> bool {
        !self.has_weird_hydrogen_properties() && !self.has_loops_or_is_disconnected()
    }

    /// Any hydrogen bonded to two or more atoms.
    pub fn has_weird_hydrogen_properties(&self) -> bool {
        self.overbonded_hydrogen().is_some()
    }

    /// First hydrogen with two or more neighbors, with its neighbor count.
    pub(crate) fn overbonded_hydrogen(&self) -> Option<(Atom, usize)> {
        self.atoms
            .iter()
            .filter(|a| a.is_hydrogen())
            .map(|h| (*h, self.neighbors(h).count()))
            .find(|(_, neighbors)| *neighbors >= 2)
    }

    /// Detects cycles and disconnected atoms with a worklist traversal from the first atom.
    ///
    /// A popped atom with two or more already-visited neighbors closes a loop; atoms left
    /// unvisited after the worklist drains mean the graph is disconnected.
    pub fn has_loops_or_is_disconnected(&self) -> bool {
        let Some(first) = self.atoms.first() else {
            return false;
        };

        let mut visited: HashSet<AtomId> = HashSet::with_capacity(self.atoms.len());
        let mut dirty = vec![*first];

        while let Some(atom) = dirty.pop() {
            if visited.contains(&atom.id) {
                // Only reachable twice through a cycle.
                return true;
            }
            let mut visited_neighbors = 0;
            for neighbor in self.neighbors(&atom) {
                if visited.contains(&neighbor.id) {
                    visited_neighbors += 1;
                } else {
                    dirty.push(neighbor);
                }
            }
            if visited_neighbors > 1 {
                return true;
            }
            visited.insert(atom.id);
        }

        visited.len() != self.atoms.len()
    }

    /// Element-typed graph isomorphism.
    ///
    /// Requires equal atom counts and histograms, then searches for an atom mapping. The search
    /// assumes both graphs are acyclic.
    pub fn is_equivalent(&self, other: &MoleculeStructure) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.atom_count() != other.atom_count() || self.histogram() != other.histogram() {
            return false;
        }
        matching::is_isomorphic(self, other, |mine, theirs| mine.has_same_element(theirs))
    }

    /// Conventional formula: organic compounds list C, then H, then the rest alphabetically;
    /// everything else is ordered by increasing electronegativity.
    pub fn general_formula(&self) -> String {
        let histogram = self.histogram();
        let organic = histogram.count(Element::C) > 0 && histogram.count(Element::H) > 0;

        let mut elements: Vec<(Element, usize)> = histogram.iter().collect();
        if organic {
            elements.sort_by(|(a, _), (b, _)| hill_rank(*a).cmp(&hill_rank(*b)).then_with(|| a.symbol().cmp(b.symbol())));
        } else {
            elements.sort_by(|(a, _), (b, _)| {
                a.electronegativity()
                    .total_cmp(&b.electronegativity())
                    .then_with(|| a.symbol().cmp(b.symbol()))
            });
        }

        let formula = formula_fragment(&elements);
        FORMULA_EXCEPTIONS
            .iter()
            .find(|(raw, _)| *raw == formula)
            .map(|(_, replacement)| replacement.to_string())
            .unwrap_or(formula)
    }

    /// Hill-system formula: with carbon, C then H then the rest alphabetically; without
    /// carbon, every element alphabetically.
    pub fn hill_system_formula(&self) -> String {
        let histogram = self.histogram();
        let has_carbon = histogram.count(Element::C) > 0;

        let mut elements: Vec<(Element, usize)> = histogram.iter().collect();
        if has_carbon {
            elements.sort_by(|(a, _), (b, _)| hill_rank(*a).cmp(&hill_rank(*b)).then_with(|| a.symbol().cmp(b.symbol())));
        } else {
            elements.sort_by(|(a, _), (b, _)| a.symbol().cmp(b.symbol()));
        }
        formula_fragment(&elements)
    }

    /// Unions two distinct structures and joins them with a new single bond `(a, b)`.
    ///
    /// # Errors
    ///
    /// * [`Error::SameMolecule`] when `mol_a` and `mol_b` are the same molecule.
    /// * [`Error::InvalidBond`] when `a` is not in `mol_a` or `b` is not in `mol_b`.
    /// * [`Error::DuplicateAtom`] when the two structures share atoms.
    pub fn combined_from_bond(
        mol_a: &MoleculeStructure,
        mol_b: &MoleculeStructure,
        a: &Atom,
        b: &Atom,
        ids: &mut IdAllocator,
    ) -> Result<MoleculeStructure, Error> {
        if mol_a.id == mol_b.id {
            return Err(Error::SameMolecule {
                molecule: mol_a.id,
                a: a.id,
                b: b.id,
            });
        }
        if !mol_a.contains_atom(a) {
            return Err(Error::invalid_bond(mol_a.id, a.id, b.id, "endpoint is not a member"));
        }
        if !mol_b.contains_atom(b) {
            return Err(Error::invalid_bond(mol_b.id, a.id, b.id, "endpoint is not a member"));
        }

        let mut combined = MoleculeStructure::with_capacity(
            ids.next_molecule_id(),
            mol_a.atom_count() + mol_b.atom_count(),
            mol_a.bond_count() + mol_b.bond_count() + 1,
        );
        for atom in mol_a.atoms.iter().chain(mol_b.atoms.iter()) {
            combined.add_atom(*atom)?;
        }
        combined.bonds.extend(mol_a.bonds.iter().copied());
        combined.bonds.extend(mol_b.bonds.iter().copied());
        combined.add_bond(a, b)?;
        Ok(combined)
    }

    /// Removes the bond `(a, b)` and partitions the remaining atoms into two new structures.
    ///
    /// The first result holds `a` and everything still reachable from it; the second holds
    /// the rest. Both keep the original relative atom order. The structure must be acyclic,
    /// otherwise the second side comes back empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BondNotFound`] when `a` and `b` are not bonded.
    pub fn split_from_broken_bond(
        structure: &MoleculeStructure,
        a: &Atom,
        b: &Atom,
        ids: &mut IdAllocator,
    ) -> Result<(MoleculeStructure, MoleculeStructure), Error> {
        let broken = *structure
            .bond_between(a, b)
            .ok_or(Error::BondNotFound { a: a.id, b: b.id })?;

        let mut side_a: HashSet<AtomId> = HashSet::new();
        side_a.insert(a.id);
        let mut dirty = vec![*a];
        while let Some(atom) = dirty.pop() {
            for bond in structure.bonds.iter().filter(|bond| **bond != broken) {
                if let Some(neighbor) = bond.other_atom(&atom) {
                    if side_a.insert(neighbor.id) {
                        dirty.push(neighbor);
                    }
                }
            }
        }
        debug_assert!(!side_a.contains(&b.id), "Broken bond was part of a loop");

        let mut mol_a = MoleculeStructure::new(ids.next_molecule_id());
        let mut mol_b = MoleculeStructure::new(ids.next_molecule_id());
        for atom in &structure.atoms {
            if side_a.contains(&atom.id) {
                mol_a.atoms.push(*atom);
            } else {
                mol_b.atoms.push(*atom);
            }
        }
        for bond in structure.bonds.iter().filter(|bond| **bond != broken) {
            if side_a.contains(&bond.a.id) {
                debug_assert!(side_a.contains(&bond.b.id));
                mol_a.bonds.push(*bond);
            } else {
                mol_b.bonds.push(*bond);
            }
        }
        Ok((mol_a, mol_b))
    }

    /// Compact text form: `atomCount|bondCount|tok|tok…`.
    ///
    /// Each atom token is the element symbol followed by `,index,order` for every bond to an
    /// atom earlier in the sequence.
    pub fn to_serial(&self) -> String {
        let mut out = format!("{}|{}", self.atoms.len(), self.bonds.len());
        for (i, atom) in self.atoms.iter().enumerate() {
            out.push('|');
            out.push_str(atom.element.symbol());
            for bond in self.bonds_involving(atom) {
                let Some(other) = bond.other_atom(atom) else {
                    continue;
                };
                if let Some(index) = self.index_of(&other).filter(|index| *index < i) {
                    let _ = write!(out, ",{},{}", index, bond.order);
                }
            }
        }
        out
    }

    /// Parses the format produced by [`MoleculeStructure::to_serial`], drawing fresh atom and
    /// molecule ids from `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed input, or the structural error raised while
    /// rebuilding the graph.
    pub fn from_serial(line: &str, ids: &mut IdAllocator) -> Result<MoleculeStructure, Error> {
        let line = line.trim();
        let mut tokens = line.split('|');

        let atom_count = parse_count(line, tokens.next(), "atom count")?;
        let bond_count = parse_count(line, tokens.next(), "bond count")?;

        // Declared counts are untrusted; the atom tokens actually present bound the allocation.
        let remaining = line.split('|').count().saturating_sub(2);
        let mut structure = MoleculeStructure::with_capacity(
            ids.next_molecule_id(),
            atom_count.min(remaining),
            bond_count.min(remaining),
        );
        for i in 0..atom_count {
            let token = tokens
                .next()
                .ok_or_else(|| Error::parse(line, format!("expected {} atoms, found {}", atom_count, i)))?;
            let mut fields = token.split(',');
            let symbol = fields.next().unwrap_or_default();
            let element: Element = symbol.parse().map_err(|e: String| Error::parse(line, e))?;
            let atom = ids.new_atom(element);
            structure.add_atom(atom)?;

            while let Some(index) = fields.next() {
                let index: usize = index
                    .parse()
                    .map_err(|_| Error::parse(line, format!("invalid bond index '{}'", index)))?;
                let order: BondOrder = fields
                    .next()
                    .ok_or_else(|| Error::parse(line, "bond index without bond order"))?
                    .parse()
                    .map_err(|e: String| Error::parse(line, e))?;
                if index >= i {
                    return Err(Error::parse(
                        line,
                        format!("atom {} bonds forward to index {}", i, index),
                    ));
                }
                let other = structure.atoms[index];
                structure.add_bond_with_order(&atom, &other, order)?;
            }
        }

        if tokens.next().is_some() {
            return Err(Error::parse(line, "trailing tokens after the last atom"));
        }
        if structure.bond_count() != bond_count {
            return Err(Error::parse(
                line,
                format!("declared {} bonds, found {}", bond_count, structure.bond_count()),
            ));
        }
        Ok(structure)
    }
}

impl fmt::Display for MoleculeStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} atoms, {} bonds)",
            self.id,
            self.general_formula(),
            self.atoms.len(),
            self.bonds.len()
        )
    }
}

fn hill_rank(element: Element) -> u8 {
    match element {
        Element::C => 0,
        Element::H => 1,
        _ => 2,
    }
}

fn formula_fragment(elements: &[(Element, usize)]) -> String {
    let mut out = String::new();
    for (element, count) in elements {
        out.push_str(element.symbol());
        if *count > 1 {
            let _ = write!(out, "{}", count);
        }
    }
    out
}

fn parse_count(line: &str, token: Option<&str>, what: &str) -> Result<usize, Error> {
    let token = token.ok_or_else(|| Error::parse(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid {} '{}'", what, token)))
}
