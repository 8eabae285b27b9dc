//! Per-kit bonding, decomposition and separation engine.
//!
//! A [`Kit`] owns a set of element buckets and the atoms pulled out of them into the play
//! area. Every atom belongs to exactly one [`MoleculeStructure`] at all times (bucket atoms are
//! single-atom structures), and every atom is registered with the kit's [`LewisDotModel`].
//!
//! Dropping a molecule triggers a bond search: each of its atoms is paired with every free
//! atom of another molecule, and the closest geometrically and chemically acceptable snap
//! position wins if it is within the bonding threshold. Whether or not a bond forms, the
//! separation solver then nudges overlapping molecules apart. All randomness (the center
//! jitter used by the solver) comes from a seedable generator.

use crate::db::MoleculeLibrary;
use crate::model::{
    atom::{Atom, AtomId, IdAllocator, MoleculeId},
    complete::CompleteMolecule,
    lewis::LewisDotModel,
    structure::MoleculeStructure,
    types::{Bounds, Direction, Element, Point, Vector},
};
use crate::ops::error::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Tuning parameters of the bonding search and separation solver.
///
/// Distances are in the same model units as atom positions (covalent radii in pm).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KitConfig {
    /// Maximum distance between an atom and its snapped position for a bond to form.
    pub bond_distance_threshold: f64,
    /// Total padding added around each molecule's bounds before overlap checks.
    pub molecule_padding: f64,
    /// Distance two overlapping molecules are pushed apart per solver iteration.
    pub push_amount: f64,
    /// Exponent applied to molecular weights when splitting a push between two molecules.
    pub push_power: f64,
    /// Upper bound on solver iterations; residual overlap past it is accepted.
    pub max_separation_iterations: usize,
    /// Optional RNG seed for deterministic separation.
    pub rng_seed: Option<u64>,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            bond_distance_threshold: 100.0,
            molecule_padding: 35.0,
            push_amount: 10.0,
            push_power: 3.0,
            max_separation_iterations: 500,
            rng_seed: None,
        }
    }
}

/// Source container of atoms of one element.
#[derive(Debug, Clone)]
pub struct Bucket {
    element: Element,
    position: Point,
    atoms: Vec<Atom>,
}

impl Bucket {
    pub fn element(&self) -> Element {
        self.element
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The atom a user would grab next.
    pub fn peek(&self) -> Option<Atom> {
        self.atoms.last().copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct KitAtom {
    atom: Atom,
    position: Point,
    in_play: bool,
}

#[derive(Debug, Clone, Copy)]
struct BucketSpec {
    element: Element,
    position: Point,
    count: usize,
}

/// Best snap found by the bond search: `ours` (in the moving molecule) lands one step from
/// `other` in `direction`.
#[derive(Debug, Clone, Copy)]
struct BondCandidate {
    ours: Atom,
    other: Atom,
    direction: Direction,
    ideal: Point,
    distance: f64,
}

/// One construction kit: buckets, atoms in play, their molecules and bond slots.
///
/// Kits borrow the shared [`MoleculeLibrary`] and own everything else, so several kits can
/// run side by side without sharing mutable state.
#[derive(Debug)]
pub struct Kit<'lib> {
    library: &'lib MoleculeLibrary,
    config: KitConfig,
    play_area: Bounds,
    ids: IdAllocator,
    atoms: BTreeMap<AtomId, KitAtom>,
    buckets: Vec<Bucket>,
    bucket_specs: Vec<BucketSpec>,
    molecules: BTreeMap<MoleculeId, MoleculeStructure>,
    molecule_by_atom: HashMap<AtomId, MoleculeId>,
    lewis: LewisDotModel,
    rng: StdRng,
}

impl<'lib> Kit<'lib> {
    /// Creates an empty kit.
    ///
    /// # Arguments
    ///
    /// * `library` - Reference data consulted for every bond attempt.
    /// * `play_area` - Rectangle molecules are kept inside during separation.
    /// * `config` - Bonding and separation parameters.
    pub fn new(library: &'lib MoleculeLibrary, play_area: Bounds, config: KitConfig) -> Self {
        let rng = build_rng(&config);
        Self {
            library,
            config,
            play_area,
            ids: IdAllocator::new(),
            atoms: BTreeMap::new(),
            buckets: Vec::new(),
            bucket_specs: Vec::new(),
            molecules: BTreeMap::new(),
            molecule_by_atom: HashMap::new(),
            lewis: LewisDotModel::new(),
            rng,
        }
    }

    /// Adds `count` fresh atoms of `element` to the bucket for that element, creating the
    /// bucket at `position` if it does not exist yet.
    pub fn add_bucket(&mut self, element: Element, position: Point, count: usize) {
        self.bucket_specs.push(BucketSpec {
            element,
            position,
            count,
        });
        self.fill_bucket(element, position, count);
    }

    pub fn library(&self) -> &'lib MoleculeLibrary {
        self.library
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn play_area(&self) -> Bounds {
        self.play_area
    }

    pub fn set_play_area(&mut self, play_area: Bounds) {
        self.play_area = play_area;
    }

    pub fn lewis(&self) -> &LewisDotModel {
        &self.lewis
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, element: Element) -> Option<&Bucket> {
        self.buckets.iter().find(|bucket| bucket.element == element)
    }

    pub fn atom(&self, id: AtomId) -> Option<Atom> {
        self.atoms.get(&id).map(|state| state.atom)
    }

    pub fn is_in_play(&self, id: AtomId) -> bool {
        self.atoms.get(&id).is_some_and(|state| state.in_play)
    }

    /// Current position; bucket atoms report their bucket's position.
    pub fn position(&self, id: AtomId) -> Option<Point> {
        self.atoms.get(&id).map(|state| state.position)
    }

    /// Molecules in the play area, in creation order.
    pub fn molecules(&self) -> impl Iterator<Item = &MoleculeStructure> {
        self.molecules.values().filter(|molecule| {
            molecule
                .atoms()
                .first()
                .is_some_and(|atom| self.is_in_play(atom.id))
        })
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&MoleculeStructure> {
        self.molecules.get(&id)
    }

    pub fn molecule_of(&self, atom: AtomId) -> Option<&MoleculeStructure> {
        self.molecule_by_atom
            .get(&atom)
            .and_then(|id| self.molecules.get(id))
    }

    /// Union of the covalent-radius circles of every atom in the molecule.
    pub fn molecule_bounds(&self, id: MoleculeId) -> Option<Bounds> {
        self.molecules
            .get(&id)?
            .atoms()
            .iter()
            .filter_map(|atom| {
                self.position(atom.id)
                    .map(|pos| Bounds::around(&pos, atom.element.covalent_radius()))
            })
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    /// Named molecule the given live molecule currently forms, if any.
    pub fn find_matching_complete_molecule(&self, id: MoleculeId) -> Option<&'lib CompleteMolecule> {
        let structure = self.molecules.get(&id)?;
        self.library.find_matching_complete_molecule(structure)
    }

    /// Kit-level acceptance: single atoms, named molecules and allowed fragments.
    pub fn is_allowed_structure(&self, structure: &MoleculeStructure) -> bool {
        structure.atom_count() < 2
            || self.library.find_matching_complete_molecule(structure).is_some()
            || self.library.is_allowed_structure(structure)
    }

    /// `true` when both atoms are in play, belong to different molecules, and joining them
    /// would produce an allowed structure.
    pub fn can_bond(&self, a: AtomId, b: AtomId) -> bool {
        if !self.is_in_play(a) || !self.is_in_play(b) {
            return false;
        }
        let (Some(atom_a), Some(atom_b)) = (self.atom(a), self.atom(b)) else {
            return false;
        };
        let (Some(mol_a), Some(mol_b)) = (self.molecule_of(a), self.molecule_of(b)) else {
            return false;
        };
        mol_a.id() != mol_b.id() && self.combination_is_allowed(mol_a, mol_b, &atom_a, &atom_b)
    }

    /// Takes an atom out of its bucket and puts it in play at `position`.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownAtom`] if the atom is not part of this kit.
    /// * [`Error::AtomInPlay`] if the atom has already left its bucket.
    pub fn add_atom_to_play(&mut self, atom: AtomId, position: Point) -> Result<(), Error> {
        let state = self
            .atoms
            .get_mut(&atom)
            .ok_or(Error::UnknownAtom { atom })?;
        if state.in_play {
            return Err(Error::AtomInPlay { atom });
        }
        state.in_play = true;
        state.position = position;
        let element = state.atom.element;

        if let Some(bucket) = self.buckets.iter_mut().find(|b| b.element == element) {
            bucket.atoms.retain(|a| a.id != atom);
        }
        Ok(())
    }

    /// Drops `atom` at `position` and tries to bond its molecule.
    ///
    /// A bucket atom is taken into play; an atom already in play drags its whole molecule
    /// along. Returns whether a bond formed.
    pub fn drop_atom(&mut self, atom: AtomId, position: Point) -> Result<bool, Error> {
        if self.is_in_play(atom) {
            let current = self.position(atom).ok_or(Error::UnknownAtom { atom })?;
            let molecule = self.molecule_id_of(atom)?;
            self.move_molecule(molecule, &(position - current))?;
        } else {
            self.add_atom_to_play(atom, position)?;
        }
        let molecule = self.molecule_id_of(atom)?;
        self.attempt_bond(molecule)
    }

    /// Translates every atom of a molecule in play.
    pub fn move_molecule(&mut self, id: MoleculeId, delta: &Vector) -> Result<(), Error> {
        self.ensure_in_play(id)?;
        self.translate(id, delta);
        Ok(())
    }

    /// Tries to bond the given molecule to the closest acceptable neighbor.
    ///
    /// On success the moving molecule snaps into place and merges with its partner. Either
    /// way, molecules are separated afterwards. Returns whether a bond formed; a declined bond
    /// is not an error.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownMolecule`] if the molecule is not live in this kit.
    /// * [`Error::AtomNotInPlay`] if the molecule is still in a bucket.
    /// * [`Error::Model`] if committing the bond breaks a structural invariant.
    pub fn attempt_bond(&mut self, id: MoleculeId) -> Result<bool, Error> {
        self.ensure_in_play(id)?;
        let moving = self
            .molecules
            .get(&id)
            .ok_or(Error::UnknownMolecule { molecule: id })?;

        let bonded = match self.best_bond_candidate(moving) {
            Some(candidate) if candidate.distance <= self.config.bond_distance_threshold => {
                self.commit_bond(id, candidate)?;
                true
            }
            Some(candidate) => {
                log::debug!(
                    "Closest bond for {} is {:.1} away, beyond the {:.1} threshold",
                    id,
                    candidate.distance,
                    self.config.bond_distance_threshold
                );
                false
            }
            None => false,
        };

        self.separate_molecules();
        Ok(bonded)
    }

    /// Breaks the bond between two atoms and splits their molecule in two.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownAtom`] if either atom is not part of this kit.
    /// * [`Error::Model`] wrapping `BondNotFound` if the atoms are not bonded.
    pub fn break_bond(&mut self, a: AtomId, b: AtomId) -> Result<(), Error> {
        let atom_a = self.atom(a).ok_or(Error::UnknownAtom { atom: a })?;
        let atom_b = self.atom(b).ok_or(Error::UnknownAtom { atom: b })?;
        let id = self.molecule_id_of(a)?;

        let (left, right) = {
            let structure = self
                .molecules
                .get(&id)
                .ok_or(Error::UnknownMolecule { molecule: id })?;
            MoleculeStructure::split_from_broken_bond(structure, &atom_a, &atom_b, &mut self.ids)?
        };
        self.lewis.break_bond(&atom_a, &atom_b)?;

        log::debug!(
            "Broke {}-{} in {}, leaving {} and {}",
            atom_a.element,
            atom_b.element,
            id,
            left,
            right
        );
        self.molecules.remove(&id);
        self.register(left);
        self.register(right);

        self.separate_molecules();
        Ok(())
    }

    /// Returns every atom of a molecule in play to its bucket.
    ///
    /// Each atom loses all its bonds and becomes a fresh single-atom structure.
    pub fn recycle_molecule(&mut self, id: MoleculeId) -> Result<(), Error> {
        self.ensure_in_play(id)?;
        let atoms: Vec<Atom> = self
            .molecules
            .get(&id)
            .ok_or(Error::UnknownMolecule { molecule: id })?
            .atoms()
            .to_vec();

        // Lewis slots first; the molecule stays registered if this fails.
        for atom in &atoms {
            self.lewis.break_bonds_of_atom(atom)?;
        }
        self.molecules.remove(&id);
        for atom in &atoms {
            self.return_to_bucket(*atom);
        }
        log::debug!("Recycled {} ({} atoms)", id, atoms.len());
        Ok(())
    }

    /// Pushes overlapping molecules apart and keeps them inside the play area.
    ///
    /// Each iteration first clamps every padded molecule bound into the play area, then
    /// pushes every intersecting pair apart along the line between their (slightly jittered)
    /// centers. The push is split by molecular weight so heavier molecules move less. Stops
    /// as soon as no pair overlaps, or at the configured iteration cap.
    pub fn separate_molecules(&mut self) {
        let live: Vec<(MoleculeId, f64)> = self
            .molecules()
            .map(|molecule| (molecule.id(), molecule.approximate_molecular_weight()))
            .collect();
        if live.is_empty() {
            return;
        }
        let half_padding = self.config.molecule_padding / 2.0;
        let power = self.config.push_power;
        let push = self.config.push_amount;

        for iteration in 0..self.config.max_separation_iterations {
            let mut placed: Vec<(MoleculeId, f64, Bounds)> = Vec::with_capacity(live.len());
            for &(id, weight) in &live {
                let Some(padded) = self.molecule_bounds(id).map(|b| b.dilated(half_padding)) else {
                    continue;
                };
                let shift = clamp_shift(&self.play_area, &padded);
                if shift != Vector::zeros() {
                    self.translate(id, &shift);
                }
                placed.push((id, weight, padded.shifted(&shift)));
            }

            let mut overlapped = false;
            for i in 0..placed.len() {
                for j in (i + 1)..placed.len() {
                    let (id_a, weight_a, bounds_a) = placed[i];
                    let (id_b, weight_b, bounds_b) = placed[j];
                    if !bounds_a.intersects(&bounds_b) {
                        continue;
                    }
                    overlapped = true;

                    let center_a = bounds_a.center() + self.jitter();
                    let center_b = bounds_b.center() + self.jitter();
                    let direction = (center_b - center_a)
                        .try_normalize(f64::EPSILON)
                        .unwrap_or_else(|| Vector::new(1.0, 0.0));

                    let weight_a = weight_a.powf(power);
                    let weight_b = weight_b.powf(power);
                    let push_ratio = weight_a / (weight_a + weight_b);

                    let delta_a = -direction * (push * (1.0 - push_ratio));
                    let delta_b = direction * (push * push_ratio);
                    self.translate(id_a, &delta_a);
                    self.translate(id_b, &delta_b);
                    placed[i].2 = bounds_a.shifted(&delta_a);
                    placed[j].2 = bounds_b.shifted(&delta_b);
                }
            }

            if !overlapped {
                log::debug!(
                    "Separated {} molecules in {} iterations",
                    live.len(),
                    iteration
                );
                return;
            }
        }

        log::warn!(
            "Separation stopped after {} iterations with molecules still overlapping",
            self.config.max_separation_iterations
        );
    }

    /// Discards every atom and molecule and refills the buckets as originally configured.
    ///
    /// Ids keep counting up, so atoms from before the reset are unknown to the kit.
    pub fn reset(&mut self) {
        self.atoms.clear();
        self.buckets.clear();
        self.molecules.clear();
        self.molecule_by_atom.clear();
        self.lewis.clear();
        for spec in self.bucket_specs.clone() {
            self.fill_bucket(spec.element, spec.position, spec.count);
        }
    }

    fn fill_bucket(&mut self, element: Element, position: Point, count: usize) {
        let index = match self.buckets.iter().position(|b| b.element == element) {
            Some(index) => index,
            None => {
                self.buckets.push(Bucket {
                    element,
                    position,
                    atoms: Vec::with_capacity(count),
                });
                self.buckets.len() - 1
            }
        };
        let position = self.buckets[index].position;

        for _ in 0..count {
            let atom = self.ids.new_atom(element);
            self.atoms.insert(
                atom.id,
                KitAtom {
                    atom,
                    position,
                    in_play: false,
                },
            );
            self.lewis.add_atom(&atom);
            self.register_single(atom);
            self.buckets[index].atoms.push(atom);
        }
    }

    fn return_to_bucket(&mut self, atom: Atom) {
        let index = match self.buckets.iter().position(|b| b.element == atom.element) {
            Some(index) => index,
            None => {
                let position = self.position(atom.id).unwrap_or(self.play_area.min);
                self.buckets.push(Bucket {
                    element: atom.element,
                    position,
                    atoms: Vec::new(),
                });
                self.buckets.len() - 1
            }
        };
        let position = self.buckets[index].position;
        if let Some(state) = self.atoms.get_mut(&atom.id) {
            state.in_play = false;
            state.position = position;
        }
        self.register_single(atom);
        self.buckets[index].atoms.push(atom);
    }

    fn register_single(&mut self, atom: Atom) {
        let id = self.ids.next_molecule_id();
        self.register(MoleculeStructure::single(id, atom));
    }

    fn register(&mut self, structure: MoleculeStructure) {
        for atom in structure.atoms() {
            self.molecule_by_atom.insert(atom.id, structure.id());
        }
        self.molecules.insert(structure.id(), structure);
    }

    fn molecule_id_of(&self, atom: AtomId) -> Result<MoleculeId, Error> {
        self.molecule_by_atom
            .get(&atom)
            .copied()
            .ok_or(Error::UnknownAtom { atom })
    }

    fn ensure_in_play(&self, id: MoleculeId) -> Result<(), Error> {
        let molecule = self
            .molecules
            .get(&id)
            .ok_or(Error::UnknownMolecule { molecule: id })?;
        match molecule.atoms().first() {
            Some(atom) if !self.is_in_play(atom.id) => Err(Error::AtomNotInPlay { atom: atom.id }),
            _ => Ok(()),
        }
    }

    fn translate(&mut self, id: MoleculeId, delta: &Vector) {
        let Some(structure) = self.molecules.get(&id) else {
            return;
        };
        for atom in structure.atoms() {
            if let Some(state) = self.atoms.get_mut(&atom.id) {
                state.position += delta;
            }
        }
    }

    fn jitter(&mut self) -> Vector {
        Vector::new(
            self.rng.random_range(-0.5..0.5),
            self.rng.random_range(-0.5..0.5),
        )
    }

    /// Builds the hypothetical merged structure on scratch ids and asks whether it is allowed.
    fn combination_is_allowed(
        &self,
        mol_a: &MoleculeStructure,
        mol_b: &MoleculeStructure,
        a: &Atom,
        b: &Atom,
    ) -> bool {
        let mut scratch = self.ids.clone();
        MoleculeStructure::combined_from_bond(mol_a, mol_b, a, b, &mut scratch)
            .is_ok_and(|combined| self.is_allowed_structure(&combined))
    }

    /// Closest acceptable snap for any atom of `moving` onto any free atom of another
    /// molecule.
    fn best_bond_candidate(&self, moving: &MoleculeStructure) -> Option<BondCandidate> {
        let mut best: Option<BondCandidate> = None;

        for ours in moving.atoms() {
            let Some(our_position) = self.position(ours.id) else {
                continue;
            };
            let our_open = self.lewis.open_directions(ours);
            if our_open.is_empty() {
                continue;
            }

            for other_state in self.atoms.values().filter(|state| state.in_play) {
                let other = other_state.atom;
                let Some(other_molecule) = self.molecule_of(other.id) else {
                    continue;
                };
                if other_molecule.id() == moving.id() {
                    continue;
                }
                if !self.combination_is_allowed(other_molecule, moving, &other, ours) {
                    continue;
                }

                for direction in self.lewis.open_directions(&other) {
                    if !our_open.contains(&direction.opposite()) {
                        continue;
                    }
                    if !self.lewis.will_allow_bond(&other, direction, ours) {
                        continue;
                    }
                    let reach = other.element.covalent_radius() + ours.element.covalent_radius();
                    let ideal = other_state.position + direction.vector() * reach;
                    let distance = nalgebra::distance(&ideal, &our_position);
                    if best.is_none_or(|b| distance < b.distance) {
                        best = Some(BondCandidate {
                            ours: *ours,
                            other,
                            direction,
                            ideal,
                            distance,
                        });
                    }
                }
            }
        }
        best
    }

    fn commit_bond(&mut self, moving_id: MoleculeId, candidate: BondCandidate) -> Result<(), Error> {
        let other_id = self.molecule_id_of(candidate.other.id)?;
        let combined = {
            let other = self
                .molecules
                .get(&other_id)
                .ok_or(Error::UnknownMolecule { molecule: other_id })?;
            let moving = self
                .molecules
                .get(&moving_id)
                .ok_or(Error::UnknownMolecule { molecule: moving_id })?;
            MoleculeStructure::combined_from_bond(
                other,
                moving,
                &candidate.other,
                &candidate.ours,
                &mut self.ids,
            )?
        };
        self.lewis
            .bond(&candidate.other, candidate.direction, &candidate.ours)?;

        let our_position = self
            .position(candidate.ours.id)
            .ok_or(Error::UnknownAtom { atom: candidate.ours.id })?;
        self.translate(moving_id, &(candidate.ideal - our_position));

        log::debug!(
            "Bonded {} {} to the {} of {} {}, forming {}",
            candidate.ours.element,
            candidate.ours.id,
            candidate.direction,
            candidate.other.element,
            candidate.other.id,
            combined
        );
        self.molecules.remove(&other_id);
        self.molecules.remove(&moving_id);
        self.register(combined);
        Ok(())
    }
}

/// Shift that moves `bounds` inside `area` along each axis; bounds wider than the area are
/// aligned to its minimum edge.
fn clamp_shift(area: &Bounds, bounds: &Bounds) -> Vector {
    let axis = |min: f64, max: f64, area_min: f64, area_max: f64| {
        if max - min > area_max - area_min || min < area_min {
            area_min - min
        } else if max > area_max {
            area_max - max
        } else {
            0.0
        }
    };
    Vector::new(
        axis(bounds.min.x, bounds.max.x, area.min.x, area.max.x),
        axis(bounds.min.y, bounds.max.y, area.min.y, area.max.y),
    )
}

fn build_rng(config: &KitConfig) -> StdRng {
    if let Some(seed) = config.rng_seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_os_rng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MoleculeLibrary {
        MoleculeLibrary::load().expect("bundled data should load")
    }

    fn play_area() -> Bounds {
        Bounds::new(Point::new(-1000.0, -1000.0), Point::new(1000.0, 1000.0))
    }

    fn seeded_config(seed: u64) -> KitConfig {
        KitConfig {
            rng_seed: Some(seed),
            ..KitConfig::default()
        }
    }

    fn kit(library: &MoleculeLibrary) -> Kit<'_> {
        let mut kit = Kit::new(library, play_area(), seeded_config(7));
        kit.add_bucket(Element::H, Point::new(-900.0, -900.0), 4);
        kit.add_bucket(Element::O, Point::new(-700.0, -900.0), 2);
        kit.add_bucket(Element::N, Point::new(-500.0, -900.0), 3);
        kit.add_bucket(Element::C, Point::new(-300.0, -900.0), 2);
        kit.add_bucket(Element::I, Point::new(-100.0, -900.0), 1);
        kit
    }

    fn take(kit: &Kit, element: Element) -> AtomId {
        kit.bucket(element).and_then(Bucket::peek).unwrap().id
    }

    /// Puts a bucket atom in play without attempting a bond.
    fn place(kit: &mut Kit, element: Element, x: f64, y: f64) -> AtomId {
        let atom = take(kit, element);
        kit.add_atom_to_play(atom, Point::new(x, y)).unwrap();
        atom
    }

    /// Drops a bucket atom into play and attempts a bond.
    fn drop_new(kit: &mut Kit, element: Element, x: f64, y: f64) -> (AtomId, bool) {
        let atom = take(kit, element);
        let bonded = kit.drop_atom(atom, Point::new(x, y)).unwrap();
        (atom, bonded)
    }

    fn build_water(kit: &mut Kit) -> (AtomId, AtomId, AtomId) {
        let o = place(kit, Element::O, 0.0, 0.0);
        let (h1, first) = drop_new(kit, Element::H, 120.0, 0.0);
        let (h2, second) = drop_new(kit, Element::H, 0.0, -115.0);
        assert!(first && second);
        (o, h1, h2)
    }

    fn padded_bounds(kit: &Kit, atom: AtomId) -> Bounds {
        let id = kit.molecule_of(atom).unwrap().id();
        kit.molecule_bounds(id)
            .unwrap()
            .dilated(kit.config().molecule_padding / 2.0)
    }

    #[test]
    fn buckets_start_full_with_nothing_in_play() {
        let library = library();
        let kit = kit(&library);

        assert_eq!(kit.bucket(Element::H).unwrap().len(), 4);
        assert_eq!(kit.buckets().len(), 5);
        assert_eq!(kit.molecules().count(), 0);
        let atom = take(&kit, Element::O);
        assert_eq!(kit.position(atom), Some(Point::new(-700.0, -900.0)));
        assert_eq!(kit.molecule_of(atom).unwrap().atom_count(), 1);
    }

    #[test]
    fn add_atom_to_play_takes_the_atom_out_of_its_bucket() {
        let library = library();
        let mut kit = kit(&library);

        let atom = place(&mut kit, Element::H, 10.0, 20.0);

        assert!(kit.is_in_play(atom));
        assert_eq!(kit.position(atom), Some(Point::new(10.0, 20.0)));
        assert_eq!(kit.bucket(Element::H).unwrap().len(), 3);
        assert_eq!(kit.molecules().count(), 1);
        assert!(matches!(
            kit.add_atom_to_play(atom, Point::origin()),
            Err(Error::AtomInPlay { .. })
        ));
        assert!(matches!(
            kit.add_atom_to_play(AtomId(9999), Point::origin()),
            Err(Error::UnknownAtom { .. })
        ));
    }

    #[test]
    fn nearby_hydrogens_bond_into_a_hydrogen_molecule() {
        let library = library();
        let mut kit = kit(&library);

        let first = place(&mut kit, Element::H, 0.0, 0.0);
        let (second, bonded) = drop_new(&mut kit, Element::H, 80.0, 0.0);

        assert!(bonded);
        assert_eq!(kit.molecules().count(), 1);
        let molecule = kit.molecule_of(first).unwrap();
        assert_eq!(molecule.id(), kit.molecule_of(second).unwrap().id());
        assert_eq!(molecule.bond_count(), 1);

        let gap = nalgebra::distance(&kit.position(first).unwrap(), &kit.position(second).unwrap());
        assert!((gap - 2.0 * Element::H.covalent_radius()).abs() < 1e-9);
        assert_eq!(
            kit.lewis().direction_between(&kit.atom(first).unwrap(), &kit.atom(second).unwrap()),
            Some(Direction::East)
        );

        let named = kit.find_matching_complete_molecule(molecule.id()).unwrap();
        assert_eq!(named.common_name(), "hydrogen");
    }

    #[test]
    fn distant_atoms_do_not_bond() {
        let library = library();
        let mut kit = kit(&library);

        place(&mut kit, Element::H, 0.0, 0.0);
        let (_, bonded) = drop_new(&mut kit, Element::H, 400.0, 0.0);

        assert!(!bonded);
        assert_eq!(kit.molecules().count(), 2);
    }

    #[test]
    fn builds_water_one_hydrogen_at_a_time() {
        let library = library();
        let mut kit = kit(&library);

        let (o, h1, h2) = build_water(&mut kit);

        let water = kit.molecule_of(o).unwrap();
        assert_eq!(water.atom_count(), 3);
        assert_eq!(water.general_formula(), "H2O");
        assert!(water.contains_atom(&kit.atom(h1).unwrap()));
        assert!(water.contains_atom(&kit.atom(h2).unwrap()));
        assert_eq!(kit.molecules().count(), 1);

        let named = kit.find_matching_complete_molecule(water.id()).unwrap();
        assert_eq!(named.common_name(), "water");
    }

    #[test]
    fn disallowed_structures_are_not_bonded() {
        let library = library();
        let mut kit = kit(&library);

        let n1 = place(&mut kit, Element::N, 0.0, 0.0);
        let (n2, formed_n2) = drop_new(&mut kit, Element::N, 160.0, 0.0);
        let (n3, formed_n3) = drop_new(&mut kit, Element::N, 310.0, 0.0);

        assert!(formed_n2);
        assert!(!formed_n3);
        assert_eq!(kit.molecules().count(), 2);
        assert_eq!(kit.molecule_of(n3).unwrap().atom_count(), 1);
        assert_eq!(kit.molecule_of(n1).unwrap().id(), kit.molecule_of(n2).unwrap().id());
        assert!(!kit.can_bond(n2, n3));
    }

    #[test]
    fn breaking_water_yields_hydroxyl_and_hydrogen() {
        let library = library();
        let mut kit = kit(&library);
        let (o, h1, h2) = build_water(&mut kit);

        kit.break_bond(o, h1).unwrap();

        assert_eq!(kit.molecules().count(), 2);
        assert_eq!(kit.molecule_of(h1).unwrap().atom_count(), 1);
        let hydroxyl = kit.molecule_of(o).unwrap();
        assert_eq!(hydroxyl.atom_count(), 2);
        assert!(hydroxyl.contains_atom(&kit.atom(h2).unwrap()));
        assert_eq!(
            kit.lewis().direction_between(&kit.atom(o).unwrap(), &kit.atom(h1).unwrap()),
            None
        );
        assert!(!padded_bounds(&kit, o).intersects(&padded_bounds(&kit, h1)));

        assert!(matches!(
            kit.break_bond(o, h1),
            Err(Error::Model(crate::model::error::Error::BondNotFound { .. }))
        ));
    }

    #[test]
    fn recycling_returns_atoms_to_their_buckets() {
        let library = library();
        let mut kit = kit(&library);
        let (o, _, _) = build_water(&mut kit);
        let id = kit.molecule_of(o).unwrap().id();

        kit.recycle_molecule(id).unwrap();

        assert_eq!(kit.molecules().count(), 0);
        assert_eq!(kit.bucket(Element::H).unwrap().len(), 4);
        assert_eq!(kit.bucket(Element::O).unwrap().len(), 2);
        assert!(!kit.is_in_play(o));
        assert_eq!(kit.position(o), Some(Point::new(-700.0, -900.0)));
        assert_eq!(kit.lewis().open_directions(&kit.atom(o).unwrap()).len(), 4);
        assert_eq!(kit.molecule_of(o).unwrap().atom_count(), 1);
        assert!(matches!(
            kit.recycle_molecule(id),
            Err(Error::UnknownMolecule { .. })
        ));
    }

    #[test]
    fn can_bond_requires_distinct_molecules_in_play() {
        let library = library();
        let mut kit = kit(&library);

        let first = place(&mut kit, Element::H, 0.0, 0.0);
        let (second, _) = drop_new(&mut kit, Element::H, 80.0, 0.0);
        let o = place(&mut kit, Element::O, 500.0, 500.0);
        let h = place(&mut kit, Element::H, -500.0, -500.0);
        let in_bucket = take(&kit, Element::H);

        assert!(!kit.can_bond(first, second));
        assert!(kit.can_bond(o, h));
        assert!(!kit.can_bond(h, in_bucket));
        // Joining H2 to oxygen would overbond a hydrogen.
        assert!(!kit.can_bond(first, o));
    }

    #[test]
    fn separation_pushes_coincident_atoms_apart() {
        let library = library();
        let mut kit = kit(&library);

        let a = place(&mut kit, Element::C, 0.0, 0.0);
        let b = place(&mut kit, Element::C, 0.0, 0.0);
        kit.separate_molecules();

        assert!(!padded_bounds(&kit, a).intersects(&padded_bounds(&kit, b)));
    }

    #[test]
    fn heavier_molecules_move_less() {
        let library = library();
        let mut kit = kit(&library);

        let iodine = place(&mut kit, Element::I, 0.0, 0.0);
        let hydrogen = place(&mut kit, Element::H, 10.0, 0.0);
        kit.separate_molecules();

        let iodine_moved = kit.position(iodine).unwrap().coords.norm();
        let hydrogen_moved = (kit.position(hydrogen).unwrap() - Point::new(10.0, 0.0)).norm();
        assert!(iodine_moved < hydrogen_moved);
    }

    #[test]
    fn separation_keeps_molecules_inside_the_play_area() {
        let library = library();
        let mut kit = kit(&library);

        let atom = place(&mut kit, Element::H, 990.0, 990.0);
        kit.separate_molecules();

        assert!(play_area().contains_bounds(&padded_bounds(&kit, atom)));
    }

    #[test]
    fn seeded_kits_separate_identically() {
        let library = library();
        let positions = |seed: u64| {
            let mut kit = Kit::new(&library, play_area(), seeded_config(seed));
            kit.add_bucket(Element::C, Point::new(-900.0, -900.0), 3);
            let atoms: Vec<AtomId> = (0..3).map(|_| place(&mut kit, Element::C, 0.0, 0.0)).collect();
            kit.separate_molecules();
            atoms
                .iter()
                .map(|atom| kit.position(*atom).unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(positions(11), positions(11));
    }

    #[test]
    fn move_molecule_translates_every_atom() {
        let library = library();
        let mut kit = kit(&library);
        let first = place(&mut kit, Element::H, 0.0, 0.0);
        let (second, _) = drop_new(&mut kit, Element::H, 80.0, 0.0);
        let before = (kit.position(first).unwrap(), kit.position(second).unwrap());
        let id = kit.molecule_of(first).unwrap().id();

        kit.move_molecule(id, &Vector::new(5.0, -5.0)).unwrap();

        assert_eq!(kit.position(first).unwrap(), before.0 + Vector::new(5.0, -5.0));
        assert_eq!(kit.position(second).unwrap(), before.1 + Vector::new(5.0, -5.0));

        let bucket_molecule = kit.molecule_of(take(&kit, Element::O)).unwrap().id();
        assert!(matches!(
            kit.move_molecule(bucket_molecule, &Vector::new(1.0, 0.0)),
            Err(Error::AtomNotInPlay { .. })
        ));
    }

    #[test]
    fn dropping_an_in_play_atom_drags_its_molecule_into_a_bond() {
        let library = library();
        let mut kit = kit(&library);
        let first = place(&mut kit, Element::H, 0.0, 0.0);
        let second = place(&mut kit, Element::H, 500.0, 0.0);

        let bonded = kit.drop_atom(second, Point::new(80.0, 0.0)).unwrap();

        assert!(bonded);
        assert_eq!(kit.molecule_of(first).unwrap().id(), kit.molecule_of(second).unwrap().id());
    }

    #[test]
    fn reset_refills_buckets_and_forgets_old_atoms() {
        let library = library();
        let mut kit = kit(&library);
        let (o, _, _) = build_water(&mut kit);

        kit.reset();

        assert_eq!(kit.molecules().count(), 0);
        assert_eq!(kit.bucket(Element::H).unwrap().len(), 4);
        assert_eq!(kit.bucket(Element::O).unwrap().len(), 2);
        assert!(kit.atom(o).is_none());
        assert!(kit.lewis().len() > 0);
    }

    #[test]
    fn recycling_failure_leaves_the_molecule_registered() {
        let library = library();
        let mut kit = kit(&library);
        let (o, h1, h2) = build_water(&mut kit);
        let id = kit.molecule_of(o).unwrap().id();
        let detached = kit.atom(h2).unwrap();
        kit.lewis.remove_atom(&detached).unwrap();

        assert!(matches!(
            kit.recycle_molecule(id),
            Err(Error::Model(crate::model::error::Error::UnknownAtom { .. }))
        ));
        assert_eq!(kit.molecule(id).map(MoleculeStructure::atom_count), Some(3));
        for atom in [o, h1, h2] {
            assert!(kit.is_in_play(atom));
            assert_eq!(kit.molecule_of(atom).unwrap().id(), id);
        }
        assert_eq!(kit.bucket(Element::H).unwrap().len(), 2);
    }

    #[test]
    fn separation_stops_at_the_iteration_cap() {
        let library = library();
        let stacked = |config: KitConfig| {
            let mut kit = Kit::new(&library, play_area(), config);
            kit.add_bucket(Element::C, Point::new(-900.0, -900.0), 3);
            let atoms: Vec<AtomId> = (0..3).map(|_| place(&mut kit, Element::C, 0.0, 0.0)).collect();
            kit.separate_molecules();
            let bounds: Vec<Bounds> = atoms.iter().map(|atom| padded_bounds(&kit, *atom)).collect();
            (0..bounds.len())
                .flat_map(|i| ((i + 1)..bounds.len()).map(move |j| (i, j)))
                .any(|(i, j)| bounds[i].intersects(&bounds[j]))
        };

        let capped = KitConfig {
            max_separation_iterations: 1,
            ..seeded_config(3)
        };
        assert!(stacked(capped));
        assert!(!stacked(seeded_config(3)));
    }

    #[test]
    fn bonding_translates_a_multi_atom_molecule_rigidly() {
        let library = library();
        let mut kit = kit(&library);
        let o = place(&mut kit, Element::O, 0.0, 0.0);
        let (h, formed) = drop_new(&mut kit, Element::H, 120.0, 0.0);
        assert!(formed);
        let free = place(&mut kit, Element::H, 0.0, 400.0);
        let before = (kit.position(o).unwrap(), kit.position(h).unwrap());

        let bonded = kit.drop_atom(o, Point::new(0.0, 295.0)).unwrap();

        assert!(bonded);
        let after = (kit.position(o).unwrap(), kit.position(h).unwrap());
        let delta_o = after.0 - before.0;
        let delta_h = after.1 - before.1;
        assert!((delta_o - delta_h).norm() < 1e-9);
        assert!((delta_o - Vector::new(0.0, 290.0)).norm() < 1e-9);
        assert!((nalgebra::distance(&after.0, &after.1) - nalgebra::distance(&before.0, &before.1)).abs() < 1e-9);

        let water = kit.molecule_of(o).unwrap();
        assert_eq!(water.atom_count(), 3);
        assert!(water.contains_atom(&kit.atom(free).unwrap()));
        assert_eq!(
            kit.lewis().direction_between(&kit.atom(free).unwrap(), &kit.atom(o).unwrap()),
            Some(Direction::South)
        );
    }

    #[test]
    fn config_reads_partial_toml() {
        let config: KitConfig = toml::from_str("push_amount = 4.0\nrng_seed = 9\n").unwrap();

        assert_eq!(config.push_amount, 4.0);
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.bond_distance_threshold, 100.0);
        assert_eq!(config.max_separation_iterations, 500);
        assert!(toml::from_str::<KitConfig>("bond_radius = 3.0").is_err());
    }
}
