//! Scoped in-place rewriting of a single file.
//!
//! The original is read line by line while the replacement is written to a sibling
//! temporary file. Only [`InPlaceFile::commit`] replaces the original, with an atomic
//! rename; dropping an uncommitted `InPlaceFile` removes the temporary file and leaves
//! the original untouched.

use crate::error::{Result, RewriteError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct InPlaceFile {
    path: PathBuf,
    reader: BufReader<File>,
    writer: BufWriter<NamedTempFile>,
}

impl InPlaceFile {
    /// Open `path` for reading and prepare its replacement next to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| RewriteError::io(&path, e))?;
        let permissions = file
            .metadata()
            .map_err(|e| RewriteError::io(&path, e))?
            .permissions();

        // Same directory, so the final rename stays on one filesystem.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(&dir).map_err(|e| RewriteError::io(&dir, e))?;
        fs::set_permissions(temp.path(), permissions).map_err(|e| RewriteError::io(temp.path(), e))?;

        Ok(Self {
            path,
            reader: BufReader::new(file),
            writer: BufWriter::new(temp),
        })
    }

    /// Read the next line of the original, terminator included. `None` at end of file.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| RewriteError::io(&self.path, e))?;
        Ok((read > 0).then_some(line))
    }

    /// Sink for the replacement content.
    pub fn output(&mut self) -> &mut impl Write {
        &mut self.writer
    }

    /// Flush the replacement and move it over the original.
    pub fn commit(self) -> Result<()> {
        let Self { path, writer, .. } = self;
        let temp = writer
            .into_inner()
            .map_err(|e| RewriteError::io(&path, e.into_error()))?;
        temp.as_file().sync_all().map_err(|e| RewriteError::io(&path, e))?;
        temp.persist(&path).map_err(|e| RewriteError::io(&path, e.error))?;
        log::debug!("Rewrote {}", path.display());
        Ok(())
    }
}
