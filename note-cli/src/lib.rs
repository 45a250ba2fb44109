//! Support code for the `notebabel` binary.

pub mod inspect;
pub mod io;
