//! Capability-based file helpers.
//!
//! Reads open the parent directory with `cap-std` and read the file through
//! that handle. Writes go through a temporary file and rename so a report is
//! never partially written.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

static PENDING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reads a UTF-8 file through a capability handle on its parent directory.
pub(crate) fn read_text(path: &Path) -> io::Result<String> {
    let dir = open_parent_dir(path)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path must be a file"))?;
    dir.read_to_string(Path::new(file_name))
}

/// Opens the directory containing `path`, treating a bare name as `.`.
pub(crate) fn open_parent_dir(path: &Path) -> io::Result<Dir> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Dir::open_ambient_dir(parent, ambient_authority())
}

/// Replaces `path` inside `dir` with `contents` in one rename.
///
/// `path` must be a single file name. The contents land in a hidden sibling
/// first; the sibling is removed again if any step before the rename fails.
pub(crate) fn write_atomic(dir: &Dir, path: &Utf8Path, contents: &str) -> io::Result<()> {
    let file_name = single_file_name(path)?;
    let pending = PendingFile::create(dir, file_name)?;
    pending.fill(contents)?;
    pending.commit(file_name)?;

    // Directory fsync is not available everywhere.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn single_file_name(path: &Utf8Path) -> io::Result<&str> {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(name)), None) => Ok(name),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("report path '{path}' must be a bare file name"),
        )),
    }
}

/// Hidden temporary file that deletes itself unless committed.
struct PendingFile<'d> {
    dir: &'d Dir,
    name: String,
    committed: bool,
}

impl<'d> PendingFile<'d> {
    fn create(dir: &'d Dir, target: &str) -> io::Result<Self> {
        let name = format!(
            ".{target}.{}-{}.partial",
            std::process::id(),
            PENDING_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        drop(dir.open_with(&name, &options)?);
        Ok(Self {
            dir,
            name,
            committed: false,
        })
    }

    fn fill(&self, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).truncate(true);
        let mut file = self.dir.open_with(&self.name, &options)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn commit(mut self, target: &str) -> io::Result<()> {
        // Rename does not replace an existing target on Windows.
        if cfg!(windows)
            && let Err(err) = self.dir.remove_file(target)
            && err.kind() != io::ErrorKind::NotFound
        {
            return Err(err);
        }
        self.dir.rename(&self.name, self.dir, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingFile<'_> {
    fn drop(&mut self) {
        if !self.committed {
            drop(self.dir.remove_file(&self.name));
        }
    }
}
