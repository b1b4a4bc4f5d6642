//! JSONL node store.
//!
//! File output is written to a temporary sibling and renamed into place by
//! [`JsonlNodeStore::finish`], so readers never observe a half-written run.

use std::fs::{self, File};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{NodeStore, StoreRecord};
use crate::error::{Error, Result};
use crate::model::{FileNode, Node};

enum Sink {
    File {
        writer: BufWriter<File>,
        temp_path: PathBuf,
        path: PathBuf,
    },
    Stdout(Stdout),
}

/// Node store writing one JSON operation per line.
pub struct JsonlNodeStore {
    sink: Mutex<Sink>,
    lines: Mutex<usize>,
}

impl JsonlNodeStore {
    /// Write operations to `path`, replacing it when the run finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn to_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("jsonl.tmp");
        let file = File::create(&temp_path)?;

        Ok(Self::with_sink(Sink::File {
            writer: BufWriter::new(file),
            temp_path,
            path: path.to_path_buf(),
        }))
    }

    /// Write operations to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_sink(Sink::Stdout(io::stdout()))
    }

    fn with_sink(sink: Sink) -> Self {
        Self {
            sink: Mutex::new(sink),
            lines: Mutex::new(0),
        }
    }

    /// Number of operations written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        *self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flush and, for file output, sync and move the file into place.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing, syncing or renaming fails.
    pub fn finish(self) -> Result<()> {
        let sink = self.sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        match sink {
            Sink::File {
                mut writer,
                temp_path,
                path,
            } => {
                writer.flush()?;
                writer.get_ref().sync_all()?;
                fs::rename(&temp_path, &path)?;
            }
            Sink::Stdout(mut out) => out.flush()?,
        }
        Ok(())
    }

    /// Drop a file output without moving it into place. An existing file at
    /// the target path is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be removed.
    pub fn discard(self) -> Result<()> {
        let sink = self.sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Sink::File {
            writer, temp_path, ..
        } = sink
        {
            drop(writer);
            fs::remove_file(&temp_path)?;
        }
        Ok(())
    }

    fn write_record(&self, record: &StoreRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);

        let written = match &mut *sink {
            Sink::File {
                writer, temp_path, ..
            } => writeln!(writer, "{line}").map_err(|e| Error::Store {
                path: temp_path.clone(),
                message: e.to_string(),
            }),
            Sink::Stdout(out) => writeln!(out.lock(), "{line}").map_err(Error::from),
        };
        written?;

        *self.lines.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

impl NodeStore for JsonlNodeStore {
    fn create_node(&self, node: &Node) -> Result<()> {
        self.write_record(&StoreRecord::CreateNode { node })
    }

    fn create_parent_child_link(&self, parent: &Node, child: &Node) -> Result<()> {
        self.write_record(&StoreRecord::CreateLink {
            parent: parent.id(),
            child: child.id(),
        })
    }

    fn register_file(&self, file: &FileNode) -> Result<()> {
        self.write_record(&StoreRecord::RegisterFile { node: file })
    }

    fn touch_node(&self, node_id: &str) -> Result<()> {
        self.write_record(&StoreRecord::TouchNode { id: node_id })
    }
}
