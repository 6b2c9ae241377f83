//! The include manifest: an ordered list of (source, target, kind) entries
//! describing exactly what goes into the package.
//!
//! The built-in manifest reproduces the canonical extension layout. An
//! alternative manifest can be loaded from a JSON file of the same shape:
//!
//! ```json
//! { "entries": [ { "source": "icons", "target": "icons", "kind": "dir" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::PackError;

/// Whether an include entry is a directory subtree or a single file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Dir,
    File,
}

/// One include entry: `source` is resolved against the package root,
/// `target` is the path the entry takes inside the archive.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IncludeEntry {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: EntryKind,
}

impl IncludeEntry {
    /// A directory subtree packaged under the same relative path.
    pub fn dir(path: &str) -> Self {
        IncludeEntry { source: path.into(), target: path.into(), kind: EntryKind::Dir }
    }

    /// A single file packaged under the same relative path.
    pub fn file(path: &str) -> Self {
        IncludeEntry { source: path.into(), target: path.into(), kind: EntryKind::File }
    }
}

/// The ordered set of include entries for one packaging run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Manifest {
    pub entries: Vec<IncludeEntry>,
}

impl Manifest {
    /// The canonical extension package layout. Entries are hand-picked so
    /// that unused dependency files stay out and the package stays small.
    pub fn builtin() -> Self {
        Manifest {
            entries: vec![
                IncludeEntry::dir("archive"),
                IncludeEntry::dir("background"),
                IncludeEntry::dir("deps/dexie/dist"),
                IncludeEntry::file("deps/dexie/LICENSE"),
                IncludeEntry::file("deps/jexl/jexl.bundle.js"),
                IncludeEntry::file("deps/jexl/LICENSE.txt"),
                IncludeEntry::file("deps/mvp/mvp.css"),
                IncludeEntry::file("deps/mvp/LICENSE"),
                IncludeEntry::file("deps/open-color/open-color.css"),
                IncludeEntry::file("deps/open-color/LICENSE"),
                IncludeEntry::dir("icons"),
                IncludeEntry::dir("images"),
                IncludeEntry::dir("popup"),
                IncludeEntry::dir("settings"),
                IncludeEntry::dir("shared"),
                IncludeEntry::file("LICENSE"),
                IncludeEntry::file("manifest.json"),
            ],
        }
    }

    /// Load an include manifest from a JSON file and validate its paths.
    pub fn from_json_file(path: &Path) -> Result<Self, PackError> {
        let text = fs::read_to_string(path).map_err(|e| PackError::io(e, path))?;
        let manifest: Manifest = serde_json::from_str(&text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject absolute paths and anything that could escape the package
    /// root (`..`) or the archive root.
    pub fn validate(&self) -> Result<(), PackError> {
        for entry in &self.entries {
            check_relative(&entry.source)?;
            check_relative(&entry.target)?;
        }
        Ok(())
    }
}

fn check_relative(path: &Path) -> Result<(), PackError> {
    let mut seen = false;
    for comp in path.components() {
        match comp {
            Component::Normal(_) => seen = true,
            Component::CurDir => {}
            _ => return Err(PackError::InvalidManifestPath(path.to_path_buf())),
        }
    }
    if !seen {
        return Err(PackError::InvalidManifestPath(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_manifest_ends_with_extension_manifest() {
        let manifest = Manifest::builtin();
        let last = manifest.entries.last().unwrap();
        assert_eq!(last.target, PathBuf::from("manifest.json"));
        assert_eq!(last.kind, EntryKind::File);
        manifest.validate().unwrap();
    }

    #[test]
    fn builtin_targets_are_unique() {
        let manifest = Manifest::builtin();
        let mut targets: Vec<_> = manifest.entries.iter().map(|e| &e.target).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), manifest.entries.len());
    }

    #[test]
    fn parses_json_manifest() {
        let json = r#"{ "entries": [
            { "source": "popup", "target": "ui/popup", "kind": "dir" },
            { "source": "manifest.json", "target": "manifest.json", "kind": "file" }
        ] }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        manifest.validate().unwrap();
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].kind, EntryKind::Dir);
        assert_eq!(manifest.entries[0].target, PathBuf::from("ui/popup"));
    }

    #[test]
    fn rejects_escaping_and_absolute_paths() {
        for bad in ["../outside", "/etc/passwd", "a/../../b", ""] {
            let manifest = Manifest {
                entries: vec![IncludeEntry::file(bad)],
            };
            assert!(
                matches!(manifest.validate(), Err(PackError::InvalidManifestPath(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
