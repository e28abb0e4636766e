// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem holding only files; directories exist implicitly
/// as prefixes of stored paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf(), content.into());
    }

    fn contents(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self.files.lock().unwrap();
        files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.contents(path)?;
        String::from_utf8(bytes).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.contents(path)?)))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files
            .keys()
            .any(|p| p != path && p.starts_with(path))
    }

    fn subdirectories(&self, path: &Path) -> Result<Vec<String>> {
        if !self.is_dir(path) {
            return Err(anyhow!("Not a directory or not found: {:?}", path));
        }

        let files = self.files.lock().unwrap();
        let mut names = BTreeSet::new();
        for file in files.keys() {
            let Ok(rel) = file.strip_prefix(path) else {
                continue;
            };
            let mut components = rel.components();
            let first = components.next();
            // Only entries with something below them are directories.
            if components.next().is_some() {
                if let Some(name) = first.and_then(|c| c.as_os_str().to_str()) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }
}
