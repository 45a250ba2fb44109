//! File names derived from note titles.

use std::collections::HashSet;

const FORBIDDEN: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];
const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];
const MAX_STEM_CHARS: usize = 120;

/// Turn a user-controlled string into a portable file stem.
///
/// Path separators, characters Windows rejects and control characters become `-`; trailing
/// dots and spaces are trimmed; reserved device names get a `_` prefix. Returns `fallback`
/// when nothing usable is left.
pub fn sanitize_file_name(raw: &str, fallback: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    let trimmed = replaced
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return fallback.to_string();
    }
    let device = trimmed.split('.').next().unwrap_or(trimmed);
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(device)) {
        return format!("_{trimmed}");
    }
    trimmed.to_string()
}

/// Hands out unique names within one archive. Comparison ignores ASCII case, as
/// case-insensitive file systems would.
#[derive(Debug, Default)]
pub struct FileNameAllocator {
    used: HashSet<String>,
}

impl FileNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `stem.ext`, or `stem (2).ext`, `stem (3).ext`… when already taken.
    pub fn allocate(&mut self, stem: &str, extension: &str) -> String {
        let mut candidate = join(stem, extension);
        let mut n = 2;
        while !self.used.insert(candidate.to_ascii_lowercase()) {
            candidate = join(&format!("{stem} ({n})"), extension);
            n += 1;
        }
        candidate
    }

    /// Claim a name verbatim. Returns `false` if it was already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.used.insert(name.to_ascii_lowercase())
    }
}

fn join(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}
