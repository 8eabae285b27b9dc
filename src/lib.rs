//! # Molecule Kit
//!
//! **Molecule Kit** is the model and rule engine behind an interactive molecule-building kit.
//! Atoms are taken from element buckets, dropped near each other, and snapped together only
//! when the result is a known molecule or a hydrogen-depleted fragment of one. Everything is
//! deterministic given a seed, and every failure surfaces as a typed error.
//!
//! ## Features
//!
//! - **Graph model** – `MoleculeStructure` stores atoms and bonds, validates tree shape and
//!   hydrogen valence, and produces general and Hill-system formulas.
//! - **Structural equivalence** – Element histograms prefilter candidates before a backtracking
//!   tree-isomorphism search; the hydrogen-stripped form compares skeletons with per-atom
//!   hydrogen counts.
//! - **Reference library** – `MoleculeLibrary` loads the bundled named molecules and allowed
//!   fragments once and answers "what is this?" and "may this exist?" for any structure.
//! - **Lewis-dot lattice** – Four bonding slots per atom and a lattice-overlap check keep every
//!   accepted molecule drawable without crossing bonds.
//! - **Kit engine** – `Kit` runs bucket bookkeeping, snap-to-bond search, bond breaking,
//!   recycling, and a weight-aware separation solver.
//!
//! ## Example
//!
//! ```no_run
//! use molecule_kit::{Bounds, Element, Kit, KitConfig, MoleculeLibrary, Point};
//!
//! let library = MoleculeLibrary::load()?;
//! let area = Bounds::new(Point::new(-500.0, -500.0), Point::new(500.0, 500.0));
//! let mut kit = Kit::new(&library, area, KitConfig::default());
//! kit.add_bucket(Element::O, Point::new(-400.0, -400.0), 1);
//! kit.add_bucket(Element::H, Point::new(-300.0, -400.0), 2);
//!
//! let oxygen = kit.bucket(Element::O).and_then(|b| b.peek()).map(|a| a.id);
//! # let _ = oxygen;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod db;
pub mod model;
pub mod ops;

mod utils;

pub use db::MoleculeLibrary;
pub use model::atom::{Atom, AtomId, IdAllocator, MoleculeId};
pub use model::complete::{AtomCoordinates, CompleteMolecule};
pub use model::histogram::ElementHistogram;
pub use model::lewis::LewisDotModel;
pub use model::stripped::StrippedMolecule;
pub use model::structure::{Bond, MoleculeStructure};
pub use model::types::{BondOrder, Bounds, Direction, Element, Point, Vector};
pub use ops::{Bucket, Kit, KitConfig};
