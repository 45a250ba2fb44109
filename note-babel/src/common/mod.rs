//! Content transformations shared by the format readers and writers.

pub mod attachments;
pub mod checklist;
pub mod cleanup;
pub mod dates;
pub mod escape;
pub mod filenames;
pub mod labels;
