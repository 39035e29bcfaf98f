use std::path::{Path, PathBuf};

/// One locally selected file pending submission.
///
/// Identity is positional: the set may hold two entries with the same name
/// and size, and removal is always by index, never by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        media_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: media_type.into(),
            path: path.into(),
        }
    }
}

/// Ordered, mutable collection of pending input files.
///
/// Indices are always `0..len()` with insertion order preserved across
/// append and removal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSet {
    entries: Vec<FileEntry>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch at the end, preserving the batch's relative order.
    /// Duplicates are allowed.
    pub fn append(&mut self, files: Vec<FileEntry>) {
        self.entries.extend(files);
    }

    /// Removes exactly one entry. Out-of-range indices are a no-op; the
    /// caller derives indices from the current render, so this is a bound
    /// check, not a reachable error path.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }
}

/// File extensions accepted by the picker dialog and the drop target.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "webm", "mpg", "mpeg", "wmv", "flv", "ogv",
];

/// Maps a path to its video MIME type, or `None` for anything outside the
/// video family. Drop intake discards `None` files and reports the count.
pub fn media_type_for_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mpg" | "mpeg" => "video/mpeg",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "ogv" => "video/ogg",
        _ => return None,
    };
    Some(media_type.to_string())
}
