use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::IndexConfig;
use crate::errors::AppError;
use crate::extraction::normalize_whitespace;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        Self::find_files_with_extensions(dir, &[extension.to_string()], true)
    }

    /// Find files matching any of `extensions` (case-insensitive, dot optional)
    pub fn find_files_with_extensions<P: AsRef<Path>>(
        dir: P,
        extensions: &[String],
        follow_links: bool,
    ) -> Result<Vec<PathBuf>> {
        let wanted: Vec<&str> = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .collect();

        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).follow_links(follow_links) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, &wanted) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    // @checks: Extension membership, ignoring case
    pub fn has_extension<P: AsRef<Path>>(path: P, extensions: &[&str]) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted))
            })
            .unwrap_or(false)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }
}

/// One file available for viewing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    /// Location on disk
    pub path: PathBuf,
    /// Display label: path relative to the indexed folder, `/`-separated
    pub key: String,
}

/// Sorted list of viewable files with substring filtering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    entries: Vec<IndexedFile>,
}

impl FileIndex {
    /// Index every matching file below `root`, sorted by key
    pub fn build<P: AsRef<Path>>(root: P, config: &IndexConfig) -> Result<Self> {
        let root = root.as_ref();
        let paths = FileManager::find_files_with_extensions(root, &config.extensions, config.follow_links)?;

        let mut entries: Vec<IndexedFile> = paths
            .into_iter()
            .map(|path| {
                let key = relative_key(root, &path);
                IndexedFile { path, key }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        debug!("Indexed {} files under {:?}", entries.len(), root);
        Ok(Self { entries })
    }

    /// Index holding just one explicitly chosen file, keyed by its file name
    pub fn single<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self {
            entries: vec![IndexedFile {
                path: path.to_path_buf(),
                key: file_label(path),
            }],
        }
    }

    pub fn entries(&self) -> &[IndexedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&IndexedFile> {
        self.entries.first()
    }

    pub fn get(&self, key: &str) -> Option<&IndexedFile> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Entries whose key contains `query`, ignoring case and extra whitespace.
    ///
    /// An empty query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&IndexedFile> {
        let query = normalize_whitespace(query).to_lowercase();
        self.entries
            .iter()
            .filter(|entry| query.is_empty() || entry.key.to_lowercase().contains(&query))
            .collect()
    }
}

/// File name of `path` for display, falling back to the whole path
pub fn file_label<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.as_os_str().is_empty() {
        return file_label(path);
    }
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
