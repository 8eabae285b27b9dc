//! Reference data: named molecules and the allowed-structure index.
//!
//! The bundled data files are compiled into the binary and parsed on demand by
//! [`MoleculeLibrary::load`]. The host application loads the library once and hands a
//! reference to every kit.

mod error;
mod loader;
mod parser;
mod store;

pub use error::Error;
pub use store::MoleculeLibrary;
