//! Canonical record, tolerant field parsing and the numbering audit.
//!
//! This module is free of XML and I/O concerns: it defines the record shape
//! every envelope is reduced to and the pure functions that run over a
//! collection of records.

mod error;
mod fields;
mod numbering;
mod partition;
mod summary;
mod types;

pub use error::*;
pub use fields::*;
pub use numbering::*;
pub use partition::*;
pub use summary::*;
pub use types::*;
