//! Core data structures modeling molecules as element-typed graphs.
//!
//! This module defines atoms and their ids, the bond graph ([`structure::MoleculeStructure`]),
//! its composition fingerprint and hydrogen-stripped canonical form, named reference
//! molecules, and the four-slot Lewis-dot lattice the kit uses to keep bonds drawable. These
//! types are consumed by the molecule library and mutated only by the kit engine.

pub mod atom;
pub mod complete;
pub mod error;
pub mod histogram;
pub mod lewis;
mod matching;
pub mod stripped;
pub mod structure;
pub mod types;
