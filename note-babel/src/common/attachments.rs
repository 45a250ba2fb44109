//! Embedded attachments.
//!
//! Readers turn inline `data:` images into detached [`Resource`]s and leave a
//! `<media type="…" hash="…"/>` placeholder behind. Writers look resources up by that hash.

use crate::diagnostics::Diagnostics;
use crate::ir::{Element, Node};
use crate::model::Resource;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MEDIA_ELEMENT: &str = "media";

static DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^data:([^;,]+);([^,]+),(.*)$").expect("valid regex"));
static EXTERNAL_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png|gif)$").expect("valid regex"));

/// Digest used for resource content hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    /// 32-bit rolling checksum. Weak; only used when configured.
    Rolling,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `data`.
    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
            HashAlgorithm::Rolling => {
                let mut hash: i32 = 0;
                for &byte in data {
                    hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(byte));
                }
                format!("{:08x}", hash.unsigned_abs())
            }
        }
    }
}

/// Result of pulling attachments out of a body.
#[derive(Debug, Default)]
pub struct Extraction {
    pub nodes: Vec<Node>,
    pub resources: Vec<Resource>,
    /// Images pointing at external files, left in place.
    pub external_references: usize,
    /// One message per attachment that could not be decoded and was dropped.
    pub failures: Vec<String>,
}

impl Extraction {
    /// Forward decode failures (warnings) and external references (info) to `diagnostics`.
    pub fn report(&self, document: &str, diagnostics: &mut Diagnostics) {
        for failure in &self.failures {
            diagnostics.warn(document, failure.clone());
        }
        if self.external_references > 0 {
            diagnostics.info(
                document,
                format!(
                    "{} image(s) reference external files and were left unresolved",
                    self.external_references
                ),
            );
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentProcessor {
    hash: HashAlgorithm,
}

impl AttachmentProcessor {
    pub fn new(hash: HashAlgorithm) -> Self {
        Self { hash }
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Replace every `data:` image in `nodes` with a media placeholder.
    ///
    /// Identical payloads share one resource. Undecodable images are removed and reported in
    /// [`Extraction::failures`].
    pub fn extract(&self, nodes: Vec<Node>) -> Extraction {
        self.extract_after(nodes, 0)
    }

    /// Like [`extract`](Self::extract), numbering file names after `existing` resources the
    /// note already has.
    pub fn extract_after(&self, nodes: Vec<Node>, existing: usize) -> Extraction {
        let mut extraction = Extraction::default();
        let nodes = self.rewrite(nodes, existing, &mut extraction);
        Extraction {
            nodes,
            ..extraction
        }
    }

    fn rewrite(&self, nodes: Vec<Node>, existing: usize, state: &mut Extraction) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Element(el) if el.name == "img" => {
                    let src = el.attr("src").unwrap_or_default().trim().to_string();
                    if let Some(caps) = DATA_URI.captures(&src) {
                        match decode_payload(&caps[2], &caps[3]) {
                            Ok(data) => {
                                let (mime, hash) =
                                    self.add_resource(state, existing, &caps[1], data);
                                out.push(media_placeholder(&mime, &hash).into());
                            }
                            Err(reason) => state
                                .failures
                                .push(format!("dropped {} attachment: {reason}", &caps[1])),
                        }
                    } else {
                        if EXTERNAL_IMAGE.is_match(&src) {
                            state.external_references += 1;
                        }
                        out.push(el.into());
                    }
                }
                Node::Element(mut el) => {
                    el.children = self.rewrite(el.children, existing, state);
                    out.push(el.into());
                }
                text => out.push(text),
            }
        }
        out
    }

    /// Returns the (mime, hash) pair of the stored resource.
    fn add_resource(
        &self,
        state: &mut Extraction,
        existing: usize,
        mime: &str,
        data: Vec<u8>,
    ) -> (String, String) {
        let hash = self.hash.digest(&data);
        if let Some(known) = state.resources.iter().find(|r| r.content_hash() == hash) {
            return (known.mime_type().to_string(), hash);
        }
        let resource = self.resource(mime, data, existing + state.resources.len() + 1);
        let key = (resource.mime_type().to_string(), resource.content_hash().to_string());
        state.resources.push(resource);
        key
    }

    /// Build a resource for raw bytes; `index` is 1-based and only used for the file name.
    pub fn resource(&self, mime: &str, data: Vec<u8>, index: usize) -> Resource {
        let mime = mime.trim().to_ascii_lowercase();
        let hash = self.hash.digest(&data);
        let file_name = format!("attachment-{index}.{}", extension_for_mime(&mime));
        Resource::new(mime, data, hash, file_name)
    }
}

fn decode_payload(encoding: &str, payload: &str) -> Result<Vec<u8>, String> {
    let is_base64 = encoding
        .rsplit(';')
        .next()
        .is_some_and(|e| e.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(format!("unsupported encoding '{encoding}'"));
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("empty payload".to_string());
    }
    STANDARD.decode(compact).map_err(|e| e.to_string())
}

/// File extension for a MIME type.
pub fn extension_for_mime(mime: &str) -> &str {
    let subtype = mime.split_once('/').map_or("", |(_, sub)| sub);
    match subtype {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        "x-icon" | "vnd.microsoft.icon" => "ico",
        "plain" => "txt",
        "" => "bin",
        sub if sub.chars().all(|c| c.is_ascii_alphanumeric()) => sub,
        _ => "bin",
    }
}

pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a base64 block, ignoring line breaks and indentation.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

/// `data:` URI embedding a resource.
pub fn data_uri(resource: &Resource) -> String {
    format!(
        "data:{};base64,{}",
        resource.mime_type(),
        encode_base64(resource.data())
    )
}

pub fn media_placeholder(mime: &str, hash: &str) -> Element {
    Element::new(MEDIA_ELEMENT)
        .with_attr("type", mime)
        .with_attr("hash", hash)
}

pub fn is_media_placeholder(el: &Element) -> bool {
    el.name == MEDIA_ELEMENT
}

/// Hashes referenced by placeholders, in document order.
pub fn placeholder_hashes(nodes: &[Node]) -> Vec<String> {
    let mut hashes = Vec::new();
    collect_hashes(nodes, &mut hashes);
    hashes
}

fn collect_hashes(nodes: &[Node], hashes: &mut Vec<String>) {
    for el in nodes.iter().filter_map(Node::as_element) {
        if is_media_placeholder(el) {
            if let Some(hash) = el.attr("hash") {
                hashes.push(hash.to_string());
            }
        } else {
            collect_hashes(&el.children, hashes);
        }
    }
}

/// Drop placeholders whose hash is not in `known`. Returns the number dropped.
pub fn resolve_placeholders(nodes: &mut Vec<Node>, known: &[&str]) -> usize {
    crate::ir::nodes::remove_elements(nodes, |el| {
        is_media_placeholder(el) && !el.attr("hash").is_some_and(|h| known.contains(&h))
    })
}
