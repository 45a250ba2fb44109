//! Markdown format tests

mod export;
mod import;
