//! # Package Assembly
//!
//! This module builds the output archive. The archive is written to a named
//! temporary file next to the final path and only renamed into place after
//! the ZIP central directory has been written and flushed, so a partial run
//! never leaves a final archive behind.
//!
//! Directory recursion is one explicit function operating on a single
//! directory level at a time; entries are visited in sorted order and every
//! ZIP entry carries a fixed timestamp, which makes repeated runs over an
//! unchanged tree byte-for-byte identical.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::manifest::{EntryKind, Manifest};
use crate::PackError;

/// Default archive location, relative to the package root.
pub const DEFAULT_OUTPUT: &str = "build/extension.xpi";

/// Writes include entries into one ZIP archive.
///
/// The handle is threaded explicitly through every operation; there is no
/// process-global output state. [`Packager::finish`] must be called to
/// produce the final archive.
pub struct Packager {
    writer: ZipWriter<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
    names: HashSet<String>,
    quiet: bool,
    files_written: u64,
}

/// Create the output directory (and parents) if absent. Idempotent.
pub fn ensure_output_dir(path: &Path) -> Result<(), PackError> {
    fs::create_dir_all(path).map_err(|e| PackError::io(e, path))
}

impl Packager {
    /// Open a fresh archive that will be persisted to `final_path` on
    /// [`finish`](Packager::finish). The temp file lives in the output
    /// directory so the final rename stays on one filesystem.
    pub fn create(final_path: &Path) -> Result<Self, PackError> {
        let out_dir = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        ensure_output_dir(out_dir)?;
        let tmp = NamedTempFile::new_in(out_dir).map_err(|e| PackError::io(e, out_dir))?;
        Ok(Packager {
            writer: ZipWriter::new(BufWriter::new(tmp)),
            final_path: final_path.to_path_buf(),
            names: HashSet::new(),
            quiet: false,
            files_written: 0,
        })
    }

    /// Suppress per-entry progress lines.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Recursively copy every regular file under `source_dir` into the
    /// archive, rooted at `target_dir`. One directory level per call:
    /// subdirectories recurse with their name appended to both sides,
    /// regular files are written at `target_dir/filename`. Symlinks and
    /// other non-regular entries are skipped.
    pub fn add_directory(&mut self, source_dir: &Path, target_dir: &Path) -> Result<(), PackError> {
        if !self.quiet {
            println!("[pack] dir  {} -> {}", source_dir.display(), target_dir.display());
        }
        let mut entries = fs::read_dir(source_dir)
            .map_err(|e| PackError::io(e, source_dir))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PackError::io(e, source_dir))?;
        // Sorted traversal keeps the archive layout independent of
        // readdir ordering.
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let source = entry.path();
            let target = target_dir.join(entry.file_name());
            let file_type = entry.file_type().map_err(|e| PackError::io(e, &source))?;
            if file_type.is_dir() {
                self.add_directory(&source, &target)?;
            } else if file_type.is_file() {
                self.write_file_entry(&source, &target)?;
            }
        }
        Ok(())
    }

    /// Write a single file into the archive at `target`.
    pub fn add_file(&mut self, source: &Path, target: &Path) -> Result<(), PackError> {
        self.write_file_entry(source, target)
    }

    fn write_file_entry(&mut self, source: &Path, target: &Path) -> Result<(), PackError> {
        let name = entry_name(target)?;
        if !self.names.insert(name.clone()) {
            return Err(PackError::DuplicateEntry(name));
        }
        if !self.quiet {
            println!("[pack] file {} -> {}", source.display(), name);
        }
        // Fixed timestamp and mode so repeated runs are byte-identical.
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);
        self.writer.start_file(&*name, options)?;
        let mut file = File::open(source).map_err(|e| PackError::io(e, source))?;
        io::copy(&mut file, &mut self.writer).map_err(|e| PackError::io(e, source))?;
        self.files_written += 1;
        Ok(())
    }

    /// Finalize the archive: write the ZIP central directory, flush, and
    /// atomically rename the temp file to the final path. Returns the
    /// number of files written. If the packager is dropped without calling
    /// this, the temp file is removed and no final archive appears.
    pub fn finish(self) -> Result<u64, PackError> {
        let Packager { mut writer, final_path, quiet, files_written, .. } = self;
        let mut buf = writer.finish()?;
        buf.flush().map_err(|e| PackError::io(e, &final_path))?;
        let tmp = buf
            .into_inner()
            .map_err(|e| PackError::io(e.into_error(), &final_path))?;
        let file = tmp
            .persist(&final_path)
            .map_err(|e| PackError::io(e.error, &final_path))?;
        file.sync_all().map_err(|e| PackError::io(e, &final_path))?;
        if !quiet {
            println!("[pack] wrote {} ({} files)", final_path.display(), files_written);
        }
        Ok(files_written)
    }
}

/// Check every manifest source against the package root before anything is
/// written; a missing or mismatched source aborts the whole run.
pub fn validate_sources(manifest: &Manifest, root: &Path) -> Result<(), PackError> {
    for entry in &manifest.entries {
        let source = root.join(&entry.source);
        let meta = match fs::metadata(&source) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PackError::MissingSource(source));
            }
            Err(e) => return Err(PackError::io(e, &source)),
        };
        let ok = match entry.kind {
            EntryKind::Dir => meta.is_dir(),
            EntryKind::File => meta.is_file(),
        };
        if !ok {
            return Err(PackError::KindMismatch { path: source, expected: entry.kind });
        }
    }
    Ok(())
}

/// Run one full packaging pass: validate, write every entry in manifest
/// order, finalize. Returns the number of files written.
pub fn run(manifest: &Manifest, root: &Path, output: &Path, quiet: bool) -> Result<u64, PackError> {
    manifest.validate()?;
    validate_sources(manifest, root)?;
    let mut packager = Packager::create(output)?.quiet(quiet);
    for entry in &manifest.entries {
        let source = root.join(&entry.source);
        match entry.kind {
            EntryKind::Dir => packager.add_directory(&source, &entry.target)?,
            EntryKind::File => packager.add_file(&source, &entry.target)?,
        }
    }
    packager.finish()
}

/// ZIP entry names are forward-slash separated regardless of platform.
fn entry_name(target: &Path) -> Result<String, PackError> {
    let mut parts: Vec<&str> = Vec::new();
    for comp in target.components() {
        match comp {
            Component::Normal(os) => {
                parts.push(os.to_str().ok_or_else(|| PackError::NonUtf8Path(target.to_path_buf()))?)
            }
            Component::CurDir => {}
            _ => return Err(PackError::InvalidManifestPath(target.to_path_buf())),
        }
    }
    if parts.is_empty() {
        return Err(PackError::InvalidManifestPath(target.to_path_buf()));
    }
    Ok(parts.join("/"))
}
