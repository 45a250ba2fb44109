//! File system side of the CLI: turning input paths into raw documents and serialized output
//! into files.
//!
//! The library never touches the file system. Inputs are read here, `.zip` bundles (Takeout
//! exports, Markdown archives) are expanded into one document per entry, and bytes are decoded
//! as lossy UTF-8.

use note_babel::{FormatRegistry, RawDocument, SerializedOutput};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Refuse archives that would expand past this many bytes.
pub const MAX_ARCHIVE_BYTES: u64 = 512 * 1024 * 1024;

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Bytes to text, replacing invalid sequences and dropping a UTF-8 BOM.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Entries that are never notes: directories and macOS resource forks.
fn is_noise(name: &str) -> bool {
    name.ends_with('/') || name.starts_with("__MACOSX/") || name.contains("/._")
}

/// Read every input into documents.
///
/// Plain files are always read. Zip entries are kept when their extension is one of
/// `extensions`, so images and JSON sidecars in an export are skipped.
pub fn collect_documents(paths: &[&Path], extensions: &[&str]) -> io::Result<Vec<RawDocument>> {
    let mut docs = Vec::new();
    for path in paths {
        let bytes = fs::read(path).map_err(|e| with_path(e, path))?;
        if is_zip(path) {
            let entries = read_zip_entries(&bytes, |name| has_extension(name, extensions))
                .map_err(|e| with_path(e, path))?;
            if entries.is_empty() {
                log::warn!("{}: no matching entries in archive", path.display());
            }
            docs.extend(entries);
        } else {
            docs.push(RawDocument::new(path.display().to_string(), decode_text(&bytes)));
        }
    }
    Ok(docs)
}

/// Decode the entries of a zip archive accepted by `keep`.
pub fn read_zip_entries<F>(bytes: &[u8], keep: F) -> io::Result<Vec<RawDocument>>
where
    F: Fn(&str) -> bool,
{
    read_zip_entries_within(bytes, keep, MAX_ARCHIVE_BYTES)
}

fn too_large(limit: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("archive expands past the {limit} byte limit"),
    )
}

/// Declared sizes are checked up front and the bytes actually read are capped at the same limit.
fn read_zip_entries_within<F>(bytes: &[u8], keep: F, limit: u64) -> io::Result<Vec<RawDocument>>
where
    F: Fn(&str) -> bool,
{
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut declared: u64 = 0;
    for i in 0..archive.len() {
        declared = declared.saturating_add(archive.by_index(i)?.size());
    }
    if declared > limit {
        return Err(too_large(limit));
    }

    let mut remaining = limit;
    let mut docs = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();
        if is_noise(&name) || !keep(&name) {
            log::debug!("skipping archive entry {name}");
            continue;
        }
        let mut buf = Vec::new();
        file.take(remaining.saturating_add(1)).read_to_end(&mut buf)?;
        remaining = remaining
            .checked_sub(buf.len() as u64)
            .ok_or_else(|| too_large(limit))?;
        docs.push(RawDocument::new(name, decode_text(&buf)));
    }
    Ok(docs)
}

/// Source format implied by the input names. Zip inputs are judged by their entries.
///
/// Returns `None` when nothing is recognised or the inputs disagree.
pub fn detect_format(registry: &FormatRegistry, paths: &[&Path]) -> Option<String> {
    let mut found = BTreeSet::new();
    for path in paths {
        if is_zip(path) {
            let names = fs::read(path)
                .ok()
                .and_then(|bytes| zip_entry_names(&bytes).ok())
                .unwrap_or_default();
            // Assets inside an archive say nothing; the first note-like entry decides
            if let Some(format) = names
                .iter()
                .filter(|name| !is_noise(name))
                .find_map(|name| registry.detect_format_from_filename(name))
            {
                found.insert(format);
            }
        } else if let Some(format) = registry.detect_format_from_filename(&path.to_string_lossy())
        {
            found.insert(format);
        }
    }
    if found.len() == 1 {
        found.into_iter().next()
    } else {
        None
    }
}

fn zip_entry_names(bytes: &[u8]) -> io::Result<Vec<String>> {
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Pack archive entries into zip bytes.
pub fn zip_bytes(entries: &[note_babel::ArchiveEntry]) -> io::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for entry in entries {
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&entry.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Write a conversion result. Single documents may go to stdout; archives need a path.
pub fn write_output(output: &SerializedOutput, target: Option<&Path>) -> io::Result<()> {
    match (output, target) {
        (SerializedOutput::Document { bytes, .. }, Some(path)) => {
            fs::write(path, bytes).map_err(|e| with_path(e, path))
        }
        (SerializedOutput::Document { bytes, .. }, None) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
        (SerializedOutput::Archive(entries), Some(path)) => {
            fs::write(path, zip_bytes(entries)?).map_err(|e| with_path(e, path))
        }
        (SerializedOutput::Archive(_), None) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "this format produces an archive of files, use -o <path.zip>",
        )),
    }
}

fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("'{}': {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_babel::ArchiveEntry;

    fn sample_zip() -> Vec<u8> {
        zip_bytes(&[
            ArchiveEntry {
                name: "Takeout/Keep/Groceries.html".to_string(),
                bytes: b"<div class=\"content\">Milk</div>".to_vec(),
            },
            ArchiveEntry {
                name: "Takeout/Keep/Groceries.json".to_string(),
                bytes: b"{}".to_vec(),
            },
            ArchiveEntry {
                name: "__MACOSX/Takeout/._Groceries.html".to_string(),
                bytes: vec![0, 1, 2],
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_decode_text_is_lossy_and_strips_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhi"), "hi");
        assert_eq!(decode_text(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_zip_entries_filtered_by_extension() {
        let docs = read_zip_entries(&sample_zip(), |name| has_extension(name, &["html"])).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Takeout/Keep/Groceries.html");
        assert!(docs[0].text.contains("Milk"));
    }

    #[test]
    fn test_archive_over_limit_is_refused() {
        let err = read_zip_entries_within(&sample_zip(), |_| true, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let docs = read_zip_entries_within(&sample_zip(), |_| true, 64).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_detect_format_from_zip_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("takeout.zip");
        fs::write(&path, sample_zip()).unwrap();
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            detect_format(&registry, &[path.as_path()]),
            Some("keep".to_string())
        );
    }

    #[test]
    fn test_detect_format_disagreement() {
        let registry = FormatRegistry::with_defaults();
        let paths = [Path::new("a.md"), Path::new("b.enex")];
        assert_eq!(detect_format(&registry, &paths), None);
        assert_eq!(
            detect_format(&registry, &[Path::new("a.md"), Path::new("b.markdown")]),
            Some("markdown".to_string())
        );
        assert_eq!(detect_format(&registry, &[Path::new("notes.txt")]), None);
    }

    #[test]
    fn test_archive_without_target_is_an_error() {
        let output = SerializedOutput::Archive(Vec::new());
        let err = write_output(&output, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
