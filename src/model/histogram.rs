//! Per-element atom counts used as a cheap composition fingerprint.

use super::structure::MoleculeStructure;
use super::types::Element;
use std::fmt::Write;

/// Number of atoms of each supported element in a structure.
///
/// Two structures with different histograms can never be equivalent, so the library indexes
/// its reference data by [`ElementHistogram::hash_string`] and only runs the expensive graph
/// search on candidates sharing the same composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementHistogram {
    counts: [usize; Element::COUNT],
}

impl ElementHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the histogram of every atom in `structure`.
    pub fn of(structure: &MoleculeStructure) -> Self {
        let mut histogram = Self::new();
        histogram.add_molecule(structure);
        histogram
    }

    pub fn add_element(&mut self, element: Element) {
        self.counts[element.index()] += 1;
    }

    pub fn add_molecule(&mut self, structure: &MoleculeStructure) {
        for atom in structure.atoms() {
            self.add_element(atom.element);
        }
    }

    pub fn count(&self, element: Element) -> usize {
        self.counts[element.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Returns `true` when this histogram has at least as many atoms of every element.
    pub fn contains_as_subset(&self, other: &ElementHistogram) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(mine, theirs)| mine >= theirs)
    }

    /// Lookup key of the counts in canonical element order, three digits per element.
    ///
    /// The key is an index only: a count of 1000 or more widens its field, so two different
    /// histograms can share a key. Lookups keyed by it must still compare candidates
    /// structurally.
    pub fn hash_string(&self) -> String {
        let mut key = String::with_capacity(Element::COUNT * 3);
        for count in &self.counts {
            let _ = write!(key, "{:03}", count);
        }
        key
    }

    /// Iterates the elements present with their counts, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, usize)> + '_ {
        Element::ALL
            .iter()
            .copied()
            .zip(self.counts.iter().copied())
            .filter(|(_, count)| *count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::IdAllocator;

    fn structure_of(elements: &[Element]) -> MoleculeStructure {
        let mut ids = IdAllocator::new();
        let mut structure = MoleculeStructure::new(ids.next_molecule_id());
        for element in elements {
            structure.add_atom(ids.new_atom(*element)).unwrap();
        }
        structure
    }

    #[test]
    fn total_equals_atom_count() {
        let structure = structure_of(&[Element::C, Element::H, Element::H, Element::O]);
        let histogram = ElementHistogram::of(&structure);

        assert_eq!(histogram.total(), structure.atom_count());
        assert_eq!(histogram.count(Element::H), 2);
        assert_eq!(histogram.count(Element::C), 1);
        assert_eq!(histogram.count(Element::N), 0);
    }

    #[test]
    fn equality_is_per_element() {
        let a = ElementHistogram::of(&structure_of(&[Element::O, Element::H, Element::H]));
        let b = ElementHistogram::of(&structure_of(&[Element::H, Element::O, Element::H]));
        let c = ElementHistogram::of(&structure_of(&[Element::O, Element::H]));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn contains_as_subset_compares_every_element() {
        let water = ElementHistogram::of(&structure_of(&[Element::O, Element::H, Element::H]));
        let hydroxyl = ElementHistogram::of(&structure_of(&[Element::O, Element::H]));
        let ammonia = ElementHistogram::of(&structure_of(&[Element::N, Element::H]));

        assert!(water.contains_as_subset(&hydroxyl));
        assert!(water.contains_as_subset(&water));
        assert!(!hydroxyl.contains_as_subset(&water));
        assert!(!water.contains_as_subset(&ammonia));
    }

    #[test]
    fn hash_string_is_fixed_width_and_distinguishes_compositions() {
        let water = ElementHistogram::of(&structure_of(&[Element::O, Element::H, Element::H]));
        let peroxide = ElementHistogram::of(&structure_of(&[
            Element::O,
            Element::O,
            Element::H,
            Element::H,
        ]));

        assert_eq!(water.hash_string().len(), Element::COUNT * 3);
        assert!(water.hash_string().starts_with("002"));
        assert_ne!(water.hash_string(), peroxide.hash_string());
    }

    #[test]
    fn hash_string_keeps_three_digits_per_element_below_a_thousand() {
        let mut histogram = ElementHistogram::default();
        for _ in 0..999 {
            histogram.add_element(Element::C);
        }

        let key = histogram.hash_string();
        assert_eq!(key.len(), Element::COUNT * 3);
        assert_eq!(&key[Element::C.index() * 3..Element::C.index() * 3 + 3], "999");
    }

    #[test]
    fn iter_skips_absent_elements() {
        let histogram = ElementHistogram::of(&structure_of(&[Element::Cl, Element::H]));
        let entries: Vec<_> = histogram.iter().collect();

        assert_eq!(entries, vec![(Element::H, 1), (Element::Cl, 1)]);
    }
}
