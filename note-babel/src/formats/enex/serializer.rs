//! Canonical notes → ENEX

use crate::common::attachments::{encode_base64, is_media_placeholder};
use crate::common::checklist::canonical_to_enml;
use crate::common::cleanup::sanitize_for_enml;
use crate::common::dates::DateGrammar;
use crate::common::escape::{escape_xml, wrap_cdata};
use crate::error::FormatError;
use crate::format::WriteContext;
use crate::ir::nodes::walk_elements_mut;
use crate::ir::{to_xml, Node};
use crate::model::{Note, Resource};
use std::fmt::Write;

const EXPORT_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE en-export SYSTEM \"http://xml.evernote.com/pub/evernote-export3.dtd\">\n";
const ENML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n\
<!DOCTYPE en-note SYSTEM \"http://xml.evernote.com/pub/enml2.dtd\">\n";

pub fn serialize_enex(notes: &[Note], ctx: &WriteContext) -> Result<String, FormatError> {
    let enex = &ctx.options.enex;
    let mut out = String::from(EXPORT_HEADER);
    writeln!(
        out,
        "<en-export export-date=\"{}\" application=\"{}\" version=\"{}\">",
        DateGrammar::Enex.render(&ctx.clock.now()),
        escape_xml(&enex.application),
        escape_xml(&enex.version)
    )
    .map_err(write_error)?;

    for note in notes {
        write_note(&mut out, note, &enex.application)?;
    }

    out.push_str("</en-export>\n");
    Ok(out)
}

fn write_note(out: &mut String, note: &Note, application: &str) -> Result<(), FormatError> {
    let enml = format!("{ENML_HEADER}<en-note>{}</en-note>", note_to_enml(note)?);

    out.push_str("  <note>\n");
    writeln!(out, "    <title>{}</title>", escape_xml(note.title())).map_err(write_error)?;
    writeln!(out, "    <content>{}</content>", wrap_cdata(&enml)).map_err(write_error)?;
    writeln!(out, "    <created>{}</created>", DateGrammar::Enex.render(&note.created()))
        .map_err(write_error)?;
    writeln!(out, "    <updated>{}</updated>", DateGrammar::Enex.render(&note.updated()))
        .map_err(write_error)?;
    for tag in note.tags() {
        writeln!(out, "    <tag>{}</tag>", escape_xml(tag)).map_err(write_error)?;
    }
    out.push_str("    <note-attributes>\n");
    writeln!(
        out,
        "      <source-application>{}</source-application>",
        escape_xml(application)
    )
    .map_err(write_error)?;
    out.push_str("    </note-attributes>\n");
    for resource in note.attachments() {
        write_resource(out, resource)?;
    }
    out.push_str("  </note>\n");
    Ok(())
}

fn write_resource(out: &mut String, resource: &Resource) -> Result<(), FormatError> {
    out.push_str("    <resource>\n");
    writeln!(
        out,
        "      <data encoding=\"base64\">{}</data>",
        encode_base64(resource.data())
    )
    .map_err(write_error)?;
    writeln!(out, "      <mime>{}</mime>", escape_xml(resource.mime_type())).map_err(write_error)?;
    out.push_str("      <resource-attributes>\n");
    writeln!(
        out,
        "        <file-name>{}</file-name>",
        escape_xml(resource.file_name())
    )
    .map_err(write_error)?;
    out.push_str("      </resource-attributes>\n");
    out.push_str("    </resource>\n");
    Ok(())
}

/// ENML body (without the `<en-note>` wrapper) for a note.
pub fn note_to_enml(note: &Note) -> Result<String, FormatError> {
    let mut nodes = canonical_to_enml(note.content_nodes()?);
    walk_elements_mut(&mut nodes, &mut |el| {
        if is_media_placeholder(el) {
            el.name = "en-media".to_string();
        }
    });
    let nodes: Vec<Node> = sanitize_for_enml(nodes);
    Ok(to_xml(&nodes))
}

fn write_error(err: std::fmt::Error) -> FormatError {
    FormatError::SerializationError(err.to_string())
}
