use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use molecule_kit::MoleculeLibrary;

use crate::commands::print_boxed_label;

/// Lists named molecules, optionally filtered by name.
#[derive(Debug, Default, Args)]
pub struct LibraryArgs {
    /// Only show molecules whose name contains this text.
    #[arg(short, long, value_name = "TEXT")]
    filter: Option<String>,
}

pub fn run(library: &MoleculeLibrary, args: &LibraryArgs) -> Result<()> {
    let filter = args.filter.as_deref().map(str::to_ascii_lowercase);
    let mut stdout = io::stdout().lock();

    print_boxed_label(&mut stdout, "Named Molecules")?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Name", "Formula", "Hill", "Atoms", "Bonds", "CID"]);

    let mut shown = 0;
    for molecule in library.complete_molecules() {
        if filter
            .as_deref()
            .is_some_and(|text| !molecule.common_name().contains(text))
        {
            continue;
        }
        let structure = molecule.structure();
        table.add_row(row![
            molecule.display_name(),
            molecule.molecular_formula(),
            structure.hill_system_formula(),
            structure.atom_count(),
            structure.bond_count(),
            molecule.cid()
        ]);
        shown += 1;
    }
    table
        .print(&mut stdout)
        .context("Failed to render molecule table")?;

    writeln!(
        &mut stdout,
        "{} of {} named molecules, {} allowed structures",
        shown,
        library.complete_molecules().len(),
        library.allowed_structure_count()
    )?;
    Ok(())
}
