//! ENEX format tests
//!
//! Reading real-shaped exports and writing exports other readers accept.

mod export;
mod import;
