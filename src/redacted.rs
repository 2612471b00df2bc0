//! Redacted block store keyed by record ordinal
//!
//! Partitions a redacted counterpart feed with the same boundary rule as the
//! message parser but keeps only the raw text of each record. Blocks are
//! keyed by their 1-based position in the feed. Field values are never
//! inspected.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::constants::HEADER_SEGMENT;
use crate::error::{Hl7Error, Result};
use crate::parser::boundary::{BoundaryTracker, LineClass};

/// Raw record text indexed by 1-based ordinal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactedBlocks {
    blocks: BTreeMap<usize, String>,

    /// Lines before the first header that belong to no block
    lines_discarded: usize,
}

impl RedactedBlocks {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build blocks from lines using the default header code
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_lines_with_sentinel(lines, HEADER_SEGMENT)
    }

    /// Build blocks from lines, opening a block at every `sentinel` line
    pub fn from_lines_with_sentinel<I, S>(lines: I, sentinel: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        let mut tracker = BoundaryTracker::new(sentinel);
        let mut current: Option<(usize, String)> = None;

        for line in lines {
            let line = line.as_ref();
            match tracker.classify(line) {
                LineClass::Preamble => {
                    store.lines_discarded += 1;
                    continue;
                }
                LineClass::Opens { ordinal } => {
                    if let Some((ordinal, text)) = current.take() {
                        store.blocks.insert(ordinal, text);
                    }
                    current = Some((ordinal, String::new()));
                }
                LineClass::Continues => {}
            }

            if let Some((_, text)) = current.as_mut() {
                text.push_str(line);
                text.push('\n');
            }
        }

        if let Some((ordinal, text)) = current.take() {
            store.blocks.insert(ordinal, text);
        }

        debug!(
            "Partitioned {} redacted blocks ({} lines discarded)",
            store.blocks.len(),
            store.lines_discarded
        );
        store
    }

    /// Build blocks from a complete block of text
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Load blocks from a file; a missing file yields an empty store
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::load_file_with_sentinel(path, HEADER_SEGMENT)
    }

    /// Load blocks from a file with a custom header code
    pub fn load_file_with_sentinel(path: &Path, sentinel: &str) -> Result<Self> {
        info!("Loading redacted feed: {}", path.display());

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let store = Self::from_lines_with_sentinel(content.lines(), sentinel);
                info!("Loaded {} redacted blocks", store.len());
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Redacted feed not found: {}", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(Hl7Error::io(
                format!("Failed to read redacted feed {}", path.display()),
                e,
            )),
        }
    }

    /// Block text for an ordinal, or `None` when no such block exists
    pub fn get(&self, ordinal: usize) -> Option<&str> {
        self.blocks.get(&ordinal).map(String::as_str)
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        self.blocks.contains_key(&ordinal)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Ordinals in ascending order
    pub fn ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.keys().copied()
    }

    /// `(ordinal, text)` pairs in ascending ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.blocks.iter().map(|(ordinal, text)| (*ordinal, text.as_str()))
    }

    pub fn lines_discarded(&self) -> usize {
        self.lines_discarded
    }
}

/// Load a redacted feed from disk
pub fn load_redacted(path: &Path) -> Result<RedactedBlocks> {
    RedactedBlocks::load_file(path)
}
