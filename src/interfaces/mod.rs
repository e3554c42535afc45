//! File formats used by the command-line interface.

pub mod csv;
pub mod json;
