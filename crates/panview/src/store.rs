#![forbid(unsafe_code)]

//! History and bookmark persistence.
//!
//! Both stores share one flat, versioned file layout:
//!
//! ```text
//! [version: u8][count: i32 BE]
//! count × { [url_len: u32 BE][url: UTF-8][title_len: u32 BE][title: UTF-8] }
//! ```
//!
//! # Failure Modes
//!
//! A missing file, an unknown version, a negative count, truncation or
//! invalid UTF-8 never surface as errors on load: the store logs a warning
//! and starts from its built-in defaults. Only `save` reports I/O failures.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::error::Result;

/// Current on-disk format version.
pub const STORE_VERSION: u8 = 1;

/// One stored URL with its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlEntry {
    pub url: String,
    pub title: String,
}

impl UrlEntry {
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Why a store file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty file")]
    Empty,
    #[error("unsupported version {found} (expected {STORE_VERSION})")]
    Version { found: u8 },
    #[error("negative entry count {0}")]
    NegativeCount(i32),
    #[error("file truncated")]
    Truncated,
    #[error("entry is not valid UTF-8")]
    Utf8,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

#[must_use]
pub fn encode_entries(entries: &[UrlEntry]) -> Vec<u8> {
    let count = i32::try_from(entries.len()).unwrap_or(i32::MAX);
    let mut out = Vec::with_capacity(5 + entries.len() * 64);
    out.push(STORE_VERSION);
    out.extend_from_slice(&count.to_be_bytes());
    for entry in entries.iter().take(count as usize) {
        put_str(&mut out, &entry.url);
        put_str(&mut out, &entry.title);
    }
    out
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&s.as_bytes()[..len as usize]);
}

pub fn decode_entries(bytes: &[u8]) -> std::result::Result<Vec<UrlEntry>, DecodeError> {
    let (&version, rest) = bytes.split_first().ok_or(DecodeError::Empty)?;
    if version != STORE_VERSION {
        return Err(DecodeError::Version { found: version });
    }
    let mut cursor = Cursor { bytes: rest };
    let count = i32::from_be_bytes(cursor.take_array()?);
    let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount(count))?;
    // Each entry needs at least 8 bytes; cap the allocation accordingly.
    let mut entries = Vec::with_capacity(count.min(cursor.bytes.len() / 8));
    for _ in 0..count {
        let url = cursor.take_str()?;
        let title = cursor.take_str()?;
        entries.push(UrlEntry { url, title });
    }
    Ok(entries)
}

struct Cursor<'a> {
    bytes: &'a [u8],
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> std::result::Result<&[u8], DecodeError> {
        if self.bytes.len() < n {
            return Err(DecodeError::Truncated);
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> std::result::Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn take_str(&mut self) -> std::result::Result<String, DecodeError> {
        let len = u32::from_be_bytes(self.take_array()?) as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::Utf8)
    }
}

/// Read a store file, or `None` (logged) when it must fall back to defaults.
fn read_entries(path: &Path) -> Option<Vec<UrlEntry>> {
    match std::fs::read(path) {
        Ok(bytes) => match decode_entries(&bytes) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(
                    target: "panview.store",
                    path = %path.display(),
                    error = %err,
                    "discarding unreadable store"
                );
                None
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(target: "panview.store", path = %path.display(), "no store file yet");
            None
        }
        Err(err) => {
            tracing::warn!(
                target: "panview.store",
                path = %path.display(),
                error = %err,
                "cannot read store"
            );
            None
        }
    }
}

fn write_entries(path: &Path, entries: &[UrlEntry]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, encode_entries(entries))?;
    std::fs::rename(&tmp, path)?;
    tracing::debug!(
        target: "panview.store",
        path = %path.display(),
        count = entries.len(),
        "store saved"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Most-recent-first visit history with a capacity bound.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStore {
    entries: Vec<UrlEntry>,
    capacity: usize,
}

impl HistoryStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Load from `path`, falling back to an empty history.
    #[must_use]
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> Self {
        let mut store = Self::new(capacity);
        if let Some(entries) = read_entries(path.as_ref()) {
            store.entries = entries;
            store.entries.truncate(store.capacity);
        }
        store
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_entries(path.as_ref(), &self.entries)
    }

    /// Record a visit, moving `url` to the front.
    pub fn visit(&mut self, url: impl Into<String>, title: impl Into<String>) {
        let entry = UrlEntry::new(url, title);
        self.entries.retain(|e| e.url != entry.url);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    #[must_use]
    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    #[must_use]
    pub fn title_for(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.url == url)
            .map(|e| e.title.as_str())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

/// Bookmarks shipped with a fresh profile.
const DEFAULT_BOOKMARKS: &[(&str, &str)] = &[
    ("https://www.rust-lang.org/", "Rust"),
    ("https://en.wikipedia.org/", "Wikipedia"),
    ("https://news.ycombinator.com/", "Hacker News"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkStore {
    entries: Vec<UrlEntry>,
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self {
            entries: DEFAULT_BOOKMARKS
                .iter()
                .map(|(url, title)| UrlEntry::new(*url, *title))
                .collect(),
        }
    }
}

impl BookmarkStore {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Load from `path`, falling back to the built-in bookmarks.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        read_entries(path.as_ref()).map_or_else(Self::default, |entries| Self { entries })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_entries(path.as_ref(), &self.entries)
    }

    /// Append a bookmark. Returns `false` if the URL is already bookmarked.
    pub fn add(&mut self, url: impl Into<String>, title: impl Into<String>) -> bool {
        let entry = UrlEntry::new(url, title);
        if self.contains(&entry.url) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Returns `true` if a bookmark was removed.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.url != url);
        self.entries.len() != before
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.url == url)
    }

    #[must_use]
    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }
}
