//! Bundling output files into a single archive.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::EncodeError;

/// Default folder that batch outputs are placed in.
pub const DEFAULT_ARCHIVE_FOLDER: &str = "resized_images";

/// Collects named files and produces one archive.
pub trait Archive {
    /// Add a file and return the name it was stored under.
    ///
    /// The stored name may differ from `name` when it collides with an
    /// earlier entry.
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<String, EncodeError>;

    /// Number of files added so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finalize and return the archive bytes.
    fn finish(self) -> Result<Vec<u8>, EncodeError>
    where
        Self: Sized;
}

/// ZIP archive writer with all entries under one folder.
///
/// Image data is already compressed, so entries are stored without deflate.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    folder: String,
    names: HashSet<String>,
}

impl ZipBuilder {
    /// Create an archive whose entries go under `folder/` (no folder if empty).
    pub fn new(folder: &str) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            folder: folder.trim_matches('/').to_string(),
            names: HashSet::new(),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    }

    /// Pick a name not used yet: `a.jpg`, `a-1.jpg`, `a-2.jpg`, ...
    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };
        (1..)
            .map(|n| match ext {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            })
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_FOLDER)
    }
}

impl Archive for ZipBuilder {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<String, EncodeError> {
        let stored = self.unique_name(name);
        if stored != name {
            log::warn!("Duplicate archive entry {} stored as {}", name, stored);
        }

        let path = if self.folder.is_empty() {
            stored.clone()
        } else {
            format!("{}/{}", self.folder, stored)
        };

        self.writer
            .start_file(path, Self::options())
            .map_err(|e| EncodeError::Archive(e.to_string()))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| EncodeError::Archive(e.to_string()))?;

        self.names.insert(stored.clone());
        Ok(stored)
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| EncodeError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
