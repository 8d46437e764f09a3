//! On-disk binding for a store: one JSON object per file, rewritten whole on every flush.

use crate::error::{Error, FileOp, Result};

use keepsake_core::Value;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// The in-memory mapping as persisted
pub type Entries = BTreeMap<String, Value>;

/// Exclusive read/write handle on a store file
///
/// Flushing truncates and rewrites in place, so a crash mid-write can leave
/// the file empty or partial.
#[derive(Debug)]
pub struct ConfigFile {
    file: File,
    path: PathBuf,
}

impl ConfigFile {
    /// Open or create the file with read/write access
    ///
    /// `mode` sets the permission bits on creation (Unix only).
    pub fn open(path: &Path, mode: u32) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        let file = options.open(path).map_err(|e| Error::io(FileOp::Open, path, e))?;
        tracing::trace!("Opened store file {}", path.display());

        Ok(Self { file, path: path.to_path_buf() })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the whole file into a mapping
    ///
    /// A zero-length file is an empty mapping. Anything else must decode as a
    /// single JSON object of text, number, and boolean values. The handle is
    /// left positioned at the start either way.
    pub fn load(&mut self) -> Result<Entries> {
        let len = self.file.metadata().map_err(|e| Error::io(FileOp::Stat, &self.path, e))?.len();
        self.rewind()?;

        if len == 0 {
            tracing::trace!("Store file is empty");
            return Ok(Entries::new());
        }

        let mut buf = Vec::with_capacity(len as usize);
        self.file
            .read_to_end(&mut buf)
            .map_err(|e| Error::io(FileOp::Read, &self.path, e))?;
        self.rewind()?;

        let entries: Entries = serde_json::from_slice(&buf).map_err(|e| Error::decode(&self.path, e))?;
        tracing::trace!("Decoded {} entries ({} bytes)", entries.len(), buf.len());
        Ok(entries)
    }

    /// Truncate, rewrite the full mapping, and sync to stable storage
    pub fn flush(&mut self, entries: &Entries) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| Error::io(FileOp::Write, &self.path, std::io::Error::other(e)))?;

        self.file
            .set_len(0)
            .map_err(|e| Error::io(FileOp::Truncate, &self.path, e))?;
        self.rewind()?;
        self.file
            .write_all(&bytes)
            .map_err(|e| Error::io(FileOp::Write, &self.path, e))?;
        self.file.sync_all().map_err(|e| Error::io(FileOp::Sync, &self.path, e))?;

        tracing::debug!("Flushed {} entries ({} bytes)", entries.len(), bytes.len());
        Ok(())
    }

    /// Final sync; the caller releases the handle once this succeeds
    pub fn close(&self) -> Result<()> {
        self.file.sync_all().map_err(|e| Error::io(FileOp::Close, &self.path, e))?;
        tracing::trace!("Closed store file {}", self.path.display());
        Ok(())
    }

    fn rewind(&mut self) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(FileOp::Seek, &self.path, e))?;
        Ok(())
    }
}
