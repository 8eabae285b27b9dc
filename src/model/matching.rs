//! Backtracking tree-isomorphism search shared by full and stripped structures.
//!
//! Starting from a fixed root in `mine`, every same-kind atom in `other` is tried as its image.
//! For a candidate pair the unvisited neighbors of both sides are compared pairwise
//! (recursively) into a square boolean matrix, and a permutation search then looks for any
//! perfect matching of that matrix. The visited sets only ever hold the current root-to-node
//! path, so the search is exact for acyclic graphs; callers gate cyclic input with
//! [`MoleculeStructure::is_valid`](super::structure::MoleculeStructure::is_valid).

use super::atom::{Atom, AtomId};
use super::structure::MoleculeStructure;

/// Returns `true` when an atom mapping makes the two graphs isomorphic under `node_match`.
///
/// `node_match` decides whether two atoms may be mapped onto each other; neighbor-count
/// equality is enforced by the search itself.
pub(crate) fn is_isomorphic<F>(mine: &MoleculeStructure, other: &MoleculeStructure, node_match: F) -> bool
where
    F: Fn(&Atom, &Atom) -> bool,
{
    if mine.atom_count() != other.atom_count() {
        return false;
    }
    let Some(root) = mine.atoms().first() else {
        return true;
    };

    let mut search = EquivalenceSearch {
        mine,
        other,
        node_match,
        my_visited: Vec::new(),
        other_visited: Vec::new(),
    };
    other
        .atoms()
        .iter()
        .any(|candidate| search.check_equivalency(root, candidate))
}

struct EquivalenceSearch<'a, F> {
    mine: &'a MoleculeStructure,
    other: &'a MoleculeStructure,
    node_match: F,
    my_visited: Vec<AtomId>,
    other_visited: Vec<AtomId>,
}

impl<F> EquivalenceSearch<'_, F>
where
    F: Fn(&Atom, &Atom) -> bool,
{
    fn check_equivalency(&mut self, my_atom: &Atom, other_atom: &Atom) -> bool {
        if !(self.node_match)(my_atom, other_atom) {
            return false;
        }

        let my_unvisited = unvisited_neighbors(self.mine, my_atom, &self.my_visited);
        let other_unvisited = unvisited_neighbors(self.other, other_atom, &self.other_visited);
        if my_unvisited.len() != other_unvisited.len() {
            return false;
        }
        let size = my_unvisited.len();

        self.my_visited.push(my_atom.id);
        self.other_visited.push(other_atom.id);

        let mut equivalences = vec![false; size * size];
        for (i, mine) in my_unvisited.iter().enumerate() {
            for (j, theirs) in other_unvisited.iter().enumerate() {
                equivalences[i * size + j] = self.check_equivalency(mine, theirs);
            }
        }

        self.my_visited.pop();
        self.other_visited.pop();

        let remaining: Vec<usize> = (0..size).collect();
        check_equivalency_matrix(&equivalences, 0, &remaining, size)
    }
}

fn unvisited_neighbors(structure: &MoleculeStructure, atom: &Atom, visited: &[AtomId]) -> Vec<Atom> {
    structure
        .neighbors(atom)
        .filter(|neighbor| !visited.contains(&neighbor.id))
        .collect()
}

/// Searches for a perfect matching in the `size × size` row-major matrix.
///
/// Row `my_index` is matched against each still-unused column in `remaining`, recursing on the
/// next row; returns as soon as any complete assignment is found.
pub(crate) fn check_equivalency_matrix(
    equivalences: &[bool],
    my_index: usize,
    remaining: &[usize],
    size: usize,
) -> bool {
    if my_index == size {
        return true;
    }
    for (position, &other_index) in remaining.iter().enumerate() {
        if !equivalences[my_index * size + other_index] {
            continue;
        }
        let mut rest = remaining.to_vec();
        rest.remove(position);
        if check_equivalency_matrix(equivalences, my_index + 1, &rest, size) {
            return true;
        }
    }
    false
}
