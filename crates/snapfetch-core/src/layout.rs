use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::manifest::ManifestRow;

const DOWNSIZED_SUFFIX: &str = "_downsized";

/// Where rows land on disk.
///
/// Primary files go to `root[/subfolder]/image_name`; downsized copies
/// mirror that layout under the sibling `<root>_downsized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root:           PathBuf,
    downsized_root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let downsized_root = downsized_sibling(&root);
        Self { root, downsized_root }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn downsized_root(&self) -> &Path { &self.downsized_root }

    pub fn target(&self, row: &ManifestRow) -> PathBuf { self.root.join(row.relative_target()) }

    pub fn downsized_target(&self, row: &ManifestRow) -> PathBuf { self.downsized_root.join(row.relative_target()) }
}

fn downsized_sibling(root: &Path) -> PathBuf {
    // Collecting components drops trailing separators.
    let mut normalized: PathBuf = root.components().collect();
    if normalized.file_name().is_none() {
        if let Ok(absolute) = std::path::absolute(&normalized) {
            normalized = absolute;
        }
    }

    let mut name: OsString = normalized.into_os_string();
    name.push(DOWNSIZED_SUFFIX);
    PathBuf::from(name)
}
