//! Line-oriented readers for the bundled reference data.
//!
//! Both files are pipe-delimited, one record per line. Blank lines and lines starting with `#`
//! are skipped; every other line must parse or the whole load fails.

use super::error::Error;
use crate::model::atom::IdAllocator;
use crate::model::complete::{AtomCoordinates, CompleteMolecule};
use crate::model::structure::MoleculeStructure;
use crate::model::types::{BondOrder, Element, Point};
use crate::utils::parallel::*;
use nalgebra::Point3;
use std::str::FromStr;

/// Non-empty, non-comment lines with their 1-based line numbers.
pub(crate) fn records(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Parses every complete-molecule record, drawing atom and molecule ids from `ids`.
pub(crate) fn parse_complete_molecules(
    source_name: &str,
    content: &str,
    ids: &mut IdAllocator,
) -> Result<Vec<(usize, CompleteMolecule)>, Error> {
    records(content)
        .into_iter()
        .map(|(line_no, line)| {
            parse_complete_molecule(source_name, line_no, line, ids).map(|molecule| (line_no, molecule))
        })
        .collect()
}

/// Parses every bare structure record.
///
/// Records are independent, so they are decoded in parallel, each with a private id space.
/// Callers renumber the results into their own id space.
pub(crate) fn parse_allowed_structures(
    source_name: &str,
    content: &str,
) -> Result<Vec<(usize, MoleculeStructure)>, Error> {
    records(content)
        .par_iter()
        .map(|(line_no, line)| {
            let mut scratch = IdAllocator::new();
            MoleculeStructure::from_serial(line, &mut scratch)
                .map(|structure| (*line_no, structure))
                .map_err(|e| Error::structure(source_name, *line_no, e))
        })
        .collect()
}

/// `name|formula|atoms|bonds|(sym|x|y|x3|y3|z3)*|(a|b|order)*|cid`, bond indices 1-based.
fn parse_complete_molecule(
    source_name: &str,
    line_no: usize,
    line: &str,
    ids: &mut IdAllocator,
) -> Result<CompleteMolecule, Error> {
    let mut fields = Fields::new(source_name, line_no, line);

    let name = fields.text("name")?;
    let formula = fields.text("formula")?;
    let atom_count: usize = fields.value("atom count")?;
    let bond_count: usize = fields.value("bond count")?;

    let mut structure = MoleculeStructure::new(ids.next_molecule_id());
    let mut coordinates = Vec::new();
    for _ in 0..atom_count {
        let element: Element = fields.value("element symbol")?;
        let x2: f64 = fields.value("2D x")?;
        let y2: f64 = fields.value("2D y")?;
        let x3: f64 = fields.value("3D x")?;
        let y3: f64 = fields.value("3D y")?;
        let z3: f64 = fields.value("3D z")?;

        structure
            .add_atom(ids.new_atom(element))
            .map_err(|e| Error::structure(source_name, line_no, e))?;
        coordinates.push(AtomCoordinates {
            pos_2d: Point::new(x2, y2),
            pos_3d: Point3::new(x3, y3, z3),
        });
    }

    for _ in 0..bond_count {
        let a = fields.atom_index("bond start", atom_count)?;
        let b = fields.atom_index("bond end", atom_count)?;
        let order: BondOrder = fields.value("bond order")?;
        let (a, b) = (structure.atoms()[a], structure.atoms()[b]);
        structure
            .add_bond_with_order(&a, &b, order)
            .map_err(|e| Error::structure(source_name, line_no, e))?;
    }

    let cid: u64 = fields.value("compound id")?;
    fields.finish()?;

    if structure.has_weird_hydrogen_properties() {
        return Err(Error::malformed(
            source_name,
            line_no,
            format!("'{}' has a hydrogen bonded to more than one atom", name),
        ));
    }
    if structure.has_loops_or_is_disconnected() {
        return Err(Error::malformed(
            source_name,
            line_no,
            format!("'{}' contains a loop or is disconnected", name),
        ));
    }

    Ok(CompleteMolecule::new(name, formula, cid, structure, coordinates))
}

/// Cursor over the `|`-separated fields of one record.
struct Fields<'a> {
    source_name: &'a str,
    line_no: usize,
    inner: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    fn new(source_name: &'a str, line_no: usize, line: &'a str) -> Self {
        Self {
            source_name,
            line_no,
            inner: line.split('|'),
        }
    }

    fn text(&mut self, what: &str) -> Result<&'a str, Error> {
        match self.inner.next().map(str::trim) {
            Some(field) if !field.is_empty() => Ok(field),
            _ => Err(Error::parse(self.source_name, self.line_no, format!("missing {}", what))),
        }
    }

    fn value<T: FromStr>(&mut self, what: &str) -> Result<T, Error> {
        let field = self.text(what)?;
        field.parse().map_err(|_| {
            Error::parse(
                self.source_name,
                self.line_no,
                format!("invalid {} '{}'", what, field),
            )
        })
    }

    /// Reads a 1-based atom index and returns it 0-based.
    fn atom_index(&mut self, what: &str, atom_count: usize) -> Result<usize, Error> {
        let index: usize = self.value(what)?;
        if index == 0 || index > atom_count {
            return Err(Error::parse(
                self.source_name,
                self.line_no,
                format!("{} {} is outside 1..={}", what, index, atom_count),
            ));
        }
        Ok(index - 1)
    }

    fn finish(mut self) -> Result<(), Error> {
        match self.inner.next() {
            None => Ok(()),
            Some(extra) => Err(Error::parse(
                self.source_name,
                self.line_no,
                format!("unexpected trailing field '{}'", extra),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "water|H2O|3|2|O|0|0|0|0|0|H|-0.79|0.61|-0.76|0.59|0|H|0.79|0.61|0.76|0.59|0|1|2|1|1|3|1|962";

    #[test]
    fn records_skip_blank_lines_and_comments() {
        let content = "# header\n\n  1|0|H  \n# note\n2|1|H|H,0,1\n";
        let records = records(content);

        assert_eq!(records, vec![(3, "1|0|H"), (5, "2|1|H|H,0,1")]);
    }

    #[test]
    fn parses_complete_molecule_record() {
        let mut ids = IdAllocator::new();
        let parsed = parse_complete_molecules("test", WATER, &mut ids).unwrap();
        let (line_no, water) = &parsed[0];

        assert_eq!(*line_no, 1);
        assert_eq!(water.common_name(), "water");
        assert_eq!(water.molecular_formula(), "H2O");
        assert_eq!(water.cid(), 962);
        assert_eq!(water.structure().general_formula(), "H2O");
        assert_eq!(water.coordinates()[1].pos_2d, Point::new(-0.79, 0.61));
        assert_eq!(water.coordinates()[2].pos_3d, Point3::new(0.76, 0.59, 0.0));
    }

    #[test]
    fn rejects_out_of_range_bond_index() {
        let mut ids = IdAllocator::new();
        let line = "oxygen|O2|2|1|O|0|0|0|0|0|O|1|0|1|0|0|1|3|2|977";

        let err = parse_complete_molecules("test", line, &mut ids).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_trailing_fields_and_missing_cid() {
        let mut ids = IdAllocator::new();

        let trailing = format!("{}|extra", WATER);
        assert!(parse_complete_molecules("test", &trailing, &mut ids).is_err());

        let truncated = WATER.rsplit_once('|').unwrap().0;
        assert!(parse_complete_molecules("test", truncated, &mut ids).is_err());
    }

    #[test]
    fn rejects_molecules_with_loops() {
        let mut ids = IdAllocator::new();
        let ring = "ring|C3|3|3|C|0|0|0|0|0|C|1|0|1|0|0|C|0|1|0|1|0|1|2|1|2|3|1|3|1|1|1";

        let err = parse_complete_molecules("test", ring, &mut ids).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn parses_allowed_structures_with_line_numbers() {
        let content = "# comment\n3|2|O|H,0,1|H,0,1\n\n2|1|C|O,0,3\n";
        let parsed = parse_allowed_structures("allowed", content).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, 2);
        assert_eq!(parsed[1].0, 4);
        assert_eq!(parsed[1].1.bonds()[0].order, BondOrder::Triple);
    }

    #[test]
    fn allowed_structure_errors_carry_the_line() {
        let content = "3|2|O|H,0,1|H,0,1\n2|1|O|Q,0,1\n";
        let err = parse_allowed_structures("allowed", content).unwrap_err();

        assert!(matches!(err, Error::Structure { line: 2, .. }));
    }

    #[test]
    fn oversized_declared_counts_are_rejected() {
        let mut ids = IdAllocator::new();

        let err = parse_complete_molecules("test", "x|X|18446744073709551615|0|H|0|0|0|0|0|1", &mut ids)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        assert!(parse_complete_molecules("test", "x|X|1|18446744073709551615|H|0|0|0|0|0|1", &mut ids).is_err());
        assert!(parse_allowed_structures("allowed", "18446744073709551615|0|H").is_err());
    }
}
