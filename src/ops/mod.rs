//! Interactive operations on a kit of atoms.
//!
//! The [`Kit`] is the only stateful piece of the crate: it owns buckets, atoms in play, their
//! molecules and the Lewis-dot slot model, and consults a shared
//! [`MoleculeLibrary`](crate::MoleculeLibrary) to decide which bonds may form.

mod error;
mod kit;

pub use error::Error;
pub use kit::{Bucket, Kit, KitConfig};
