use std::collections::HashSet;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::layout::OutputLayout;
use crate::manifest::Manifest;

/// What the output directory already holds before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputState {
    /// The directory does not exist yet.
    Absent,
    /// The directory exists; `present` of the `expected` targets are in it.
    Existing { present: usize, expected: usize },
}

impl OutputState {
    /// Every download candidate is already on disk.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Existing { present, expected } if *expected > 0 && present == expected)
    }
}

/// Compare the files under the output root against the manifest's targets.
pub fn inspect_output(layout: &OutputLayout, manifest: &Manifest) -> Result<OutputState> {
    let root = layout.root();
    if !root.exists() {
        return Ok(OutputState::Absent);
    }

    let mut on_disk: HashSet<PathBuf> = HashSet::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| Error::Inspect {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            on_disk.insert(entry.into_path());
        }
    }

    let expected = manifest.expected_count();
    let present = manifest
        .candidates()
        .filter(|row| on_disk.contains(&layout.target(row)))
        .count();
    tracing::debug!(root = %root.display(), files = on_disk.len(), present, expected, "inspected output directory");

    Ok(OutputState::Existing { present, expected })
}
