//! Source origin classification from preprocessor line markers
//!
//! Preprocessed C (`cc -E`) interleaves the translation unit with the text
//! of every included header, separated by line markers:
//!
//! ```text
//! # 1 "/usr/include/stdio.h" 1 3 4
//! # 42 "app.c"
//! #line 7 "app.c"
//! ```
//!
//! Flag `3` marks a system header. Headers under a known system prefix are
//! treated as system code even without the flag. Input without any markers
//! is entirely project code.

use log::debug;

use crate::domain::{Origin, Span};

/// Include directories treated as system code regardless of marker flags
pub const DEFAULT_SYSTEM_PREFIXES: &[&str] = &[
    "/usr/include/",
    "/usr/local/include/",
    "/usr/lib/",
    "/lib/",
];

/// A parsed line marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    pub line: u64,
    pub file: String,
    pub flags: Vec<u8>,
}

impl LineMarker {
    /// Parse `# <line> "<file>" <flags>` or `#line <line> "<file>"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('#')?.trim_start();
        let rest = rest.strip_prefix("line").unwrap_or(rest).trim_start();

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let line = rest[..digits].parse().ok()?;

        let rest = rest[digits..].trim_start();
        let quoted = rest.strip_prefix('"')?;
        let close = quoted.find('"')?;
        let file = quoted[..close].to_string();
        let flags = quoted[close + 1..]
            .split_whitespace()
            .filter_map(|f| f.parse().ok())
            .collect();

        Some(Self { line, file, flags })
    }

    #[must_use]
    pub fn is_system_flagged(&self) -> bool {
        self.flags.contains(&3)
    }
}

/// Maps byte offsets of a translation unit to the origin of the text there.
#[derive(Debug, Clone, Default)]
pub struct OriginMap {
    /// Region start offsets with the origin in effect from there on, ascending
    regions: Vec<(usize, Origin)>,
    /// Byte ranges of the marker lines themselves, newline excluded
    markers: Vec<Span>,
}

impl OriginMap {
    /// Scan `source` for line markers.
    #[must_use]
    pub fn scan(source: &str, system_prefixes: &[String]) -> Self {
        let mut map = Self::default();
        let mut offset = 0;

        for line in source.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some(marker) = LineMarker::parse(content) {
                let origin = classify_file(&marker, system_prefixes);
                debug!("line marker {:?} -> {origin:?}", marker.file);
                map.markers.push(Span::new(offset, offset + content.len()));
                map.regions.push((offset + line.len(), origin));
            }
            offset += line.len();
        }

        map
    }

    /// Origin of the text at `offset`.
    #[must_use]
    pub fn origin_at(&self, offset: usize) -> Origin {
        let idx = self.regions.partition_point(|(start, _)| *start <= offset);
        if idx == 0 {
            Origin::Project
        } else {
            self.regions[idx - 1].1
        }
    }

    /// Byte ranges of the marker lines.
    #[must_use]
    pub fn markers(&self) -> &[Span] {
        &self.markers
    }

    /// Copy of `source` with every marker line blanked out.
    ///
    /// Byte offsets and line numbers are preserved, so positions found in
    /// the masked text are valid in the original.
    #[must_use]
    pub fn mask(&self, source: &str) -> String {
        let mut bytes = source.as_bytes().to_vec();
        for span in &self.markers {
            bytes[span.start..span.end].fill(b' ');
        }
        // Only whole lines were replaced by ASCII spaces
        String::from_utf8(bytes).unwrap_or_else(|_| source.to_string())
    }
}

fn classify_file(marker: &LineMarker, system_prefixes: &[String]) -> Origin {
    if marker.is_system_flagged() {
        return Origin::System;
    }
    let path = marker.file.as_str();
    let under_prefix = DEFAULT_SYSTEM_PREFIXES.iter().any(|p| path.starts_with(p))
        || system_prefixes.iter().any(|p| path.starts_with(p.as_str()));
    if under_prefix {
        Origin::System
    } else {
        Origin::Project
    }
}
