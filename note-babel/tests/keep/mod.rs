//! Google Keep format tests

mod groceries;
mod roundtrip;
