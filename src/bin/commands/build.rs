use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use prettytable::{Table, format, row};

use molecule_kit::{Bounds, Element, Kit, KitConfig, MoleculeLibrary, Point};

use crate::commands::{print_boxed_label, run_with_spinner, yes_no};

/// Simulates a user dropping atoms into a kit, in order.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Atom to drop, as `SYMBOL@X,Y` (e.g. `O@0,0`). Repeat in drop order.
    #[arg(short, long = "atom", value_name = "SYM@X,Y", required = true)]
    atoms: Vec<Placement>,
    /// TOML file with kit settings; missing keys keep their defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// RNG seed for separation; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Half-width of the square play area centered on the origin.
    #[arg(long, default_value_t = 1000.0)]
    extent: f64,
}

/// One `--atom` argument.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    element: Element,
    position: Point,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, coords) = s
            .split_once('@')
            .ok_or_else(|| format!("expected SYMBOL@X,Y, got '{}'", s))?;
        let element = symbol.trim().parse::<Element>()?;
        let (x, y) = coords
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y after '@', got '{}'", coords))?;
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid coordinate '{}': {}", value, e))
        };
        Ok(Self {
            element,
            position: Point::new(parse(x)?, parse(y)?),
        })
    }
}

pub fn run(library: &MoleculeLibrary, args: &BuildArgs) -> Result<()> {
    let config = load_config(args)?;
    let extent = args.extent.abs();
    let area = Bounds::new(Point::new(-extent, -extent), Point::new(extent, extent));

    let mut kit = Kit::new(library, area, config);
    let mut counts: BTreeMap<Element, usize> = BTreeMap::new();
    for placement in &args.atoms {
        *counts.entry(placement.element).or_default() += 1;
    }
    for (slot, (element, count)) in counts.iter().enumerate() {
        let bucket_position = Point::new(-extent + 100.0 * slot as f64, -extent - 100.0);
        kit.add_bucket(*element, bucket_position, *count);
    }

    let bonds = run_with_spinner("Dropping atoms", || {
        let mut bonds = 0;
        for placement in &args.atoms {
            let atom = kit
                .bucket(placement.element)
                .and_then(|bucket| bucket.peek())
                .ok_or_else(|| anyhow!("No {} atoms left in the kit", placement.element))?;
            let bonded = kit
                .drop_atom(atom.id, placement.position)
                .with_context(|| format!("Failed to drop {} at {}", atom, placement.position))?;
            log::info!(
                "Dropped {} at ({}, {}): {}",
                atom,
                placement.position.x,
                placement.position.y,
                if bonded { "bonded" } else { "no bond" }
            );
            bonds += usize::from(bonded);
        }
        Ok(bonds)
    })?;

    print_molecules(&kit, bonds)
}

fn load_config(args: &BuildArgs) -> Result<KitConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read kit config {}", path.display()))?;
            toml::from_str::<KitConfig>(&text)
                .with_context(|| format!("Failed to parse kit config {}", path.display()))?
        }
        None => KitConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }
    Ok(config)
}

fn print_molecules(kit: &Kit, bonds: usize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    print_boxed_label(&mut stdout, "Kit Molecules")?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Molecule", "Formula", "Atoms", "Center", "Allowed", "Named"]);
    for molecule in kit.molecules() {
        let center = kit
            .molecule_bounds(molecule.id())
            .map(|bounds| {
                let c = bounds.center();
                format!("({:.1}, {:.1})", c.x, c.y)
            })
            .unwrap_or_default();
        let named = kit
            .find_matching_complete_molecule(molecule.id())
            .map_or_else(|| "-".to_string(), |m| m.display_name());
        table.add_row(row![
            molecule.id(),
            molecule.general_formula(),
            molecule.atom_count(),
            center,
            yes_no(kit.is_allowed_structure(molecule)),
            named
        ]);
    }
    table
        .print(&mut stdout)
        .context("Failed to render kit molecules")?;
    writeln!(&mut stdout, "{} bonds formed", bonds)?;
    Ok(())
}
