use std::io;

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use molecule_kit::{IdAllocator, MoleculeLibrary, MoleculeStructure};

use crate::commands::{print_boxed_label, yes_no};

/// Checks one serialized structure against the library.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Structure in the compact serial format, e.g. `3|2|O|H,0,1|H,0,1`.
    #[arg(value_name = "SERIAL")]
    serial: String,
}

pub fn run(library: &MoleculeLibrary, args: &CheckArgs) -> Result<()> {
    let mut ids = IdAllocator::new();
    let structure = MoleculeStructure::from_serial(&args.serial, &mut ids)
        .with_context(|| format!("Failed to parse structure '{}'", args.serial))?;

    let valid = structure.is_valid();
    let allowed = library.is_allowed_structure(&structure);
    let named = library.find_matching_complete_molecule(&structure);
    log::info!("Checked {}: valid={}, allowed={}", structure, valid, allowed);

    let mut stdout = io::stdout().lock();
    print_boxed_label(&mut stdout, "Structure Check")?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Atoms", structure.atom_count()]);
    table.add_row(row!["Bonds", structure.bond_count()]);
    table.add_row(row!["Formula", structure.general_formula()]);
    table.add_row(row!["Hill Formula", structure.hill_system_formula()]);
    table.add_row(row![
        "Approx. Weight",
        format!("{:.3}", structure.approximate_molecular_weight())
    ]);
    table.add_row(row!["Valid Tree", yes_no(valid)]);
    table.add_row(row![
        "Overbonded Hydrogen",
        yes_no(structure.has_weird_hydrogen_properties())
    ]);
    table.add_row(row!["Allowed", yes_no(allowed)]);
    let named = named.map_or_else(
        || "-".to_string(),
        |m| format!("{} (CID {})", m.display_name(), m.cid()),
    );
    table.add_row(row!["Named Molecule", named]);
    table
        .print(&mut stdout)
        .context("Failed to render structure check")?;
    Ok(())
}
