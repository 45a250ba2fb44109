//! Intermediate Representation (IR) for note bodies.
//!
//! Every reader lowers its source markup (ENML via `roxmltree`, Keep HTML via `html5ever`,
//! Markdown via `comrak`) into this owned node tree, runs the common transforms over it, and
//! stores the result on the note as canonical markup (see [`to_xml`]). Writers parse the
//! canonical markup back with [`from_xml::parse_fragment`] and lower it into their own
//! dialect.
//!
//! Canonical vocabulary on top of plain HTML elements:
//!
//! | Construct        | Canonical markup                                 |
//! |------------------|--------------------------------------------------|
//! | Checklist item   | `<li data-checked="true">text</li>`              |
//! | Media reference  | `<media type="image/png" hash="<content hash>"/>`|

pub mod from_html;
pub mod from_xml;
pub mod nodes;
pub mod to_xml;

pub use nodes::{Element, Node};
pub use to_xml::to_xml;
