//! Index fragment: `<sqlFile>` entries for scripts the changelog does not know yet.
//!
//! The fragment is plain text meant to be pasted into the changelog by an
//! operator. It has one section marker per object kind followed by one
//! line per newly generated script.

use crate::error::{ExportError, Result};
use crate::manifest::RegisteredPaths;
use crate::script::UTF8_BOM;
use crate::source::ObjectKind;
use quick_xml::escape::escape;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of offering a script path to the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A line was written.
    Announced,
    /// The changelog already references the path.
    AlreadyRegistered,
    /// The path was announced earlier in this run.
    AlreadyAnnounced,
}

/// Append-only writer for the index fragment.
pub struct IndexFragment<W: Write> {
    writer: W,
    path: PathBuf,
    announced: HashSet<String>,
}

impl IndexFragment<BufWriter<File>> {
    /// Create (or truncate) the fragment file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ExportError::write(path, e))?;
        Self::new(BufWriter::new(file), path)
    }
}

impl<W: Write> IndexFragment<W> {
    /// Wrap `writer`, writing the byte order mark immediately.
    /// `path` names the destination in error messages.
    pub fn new(mut writer: W, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        writer
            .write_all(UTF8_BOM)
            .map_err(|e| ExportError::write(&path, e))?;
        Ok(Self {
            writer,
            path,
            announced: HashSet::new(),
        })
    }

    /// Write the marker that opens the section for `kind`.
    pub fn section(&mut self, kind: ObjectKind) -> Result<()> {
        let marker = format!("\n<!-- {} -->\n", kind.section_label());
        self.write_str(&marker)
    }

    /// Announce `relative_path` unless the changelog already has it.
    pub fn register(
        &mut self,
        registered: &RegisteredPaths,
        relative_path: &str,
        kind: ObjectKind,
    ) -> Result<Registration> {
        if registered.contains(relative_path) {
            return Ok(Registration::AlreadyRegistered);
        }
        if !self.announced.insert(relative_path.to_string()) {
            return Ok(Registration::AlreadyAnnounced);
        }

        let line = sql_file_line(relative_path, kind.split_statements());
        self.write_str(&line)?;
        Ok(Registration::Announced)
    }

    /// Number of lines announced so far.
    pub fn announced(&self) -> usize {
        self.announced.len()
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| ExportError::write(&self.path, e))?;
        Ok(self.writer)
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| ExportError::write(&self.path, e))
    }
}

/// Render one `<sqlFile>` entry.
pub fn sql_file_line(relative_path: &str, split_statements: bool) -> String {
    format!(
        "<sqlFile path=\"{}\" relativeToChangelogFile=\"true\" splitStatements=\"{}\" encoding=\"utf8\" />\n",
        escape(relative_path),
        split_statements
    )
}
