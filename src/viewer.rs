use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::app_config::Config;
use crate::document::XmlDocument;
use crate::errors::{AppError, DocumentError};
use crate::extraction::{extract_document, translated_count, translation_coverage, ExtractionResult, Segment};
use crate::file_utils::{file_label, FileIndex, FileManager, IndexedFile};
use crate::rendering::{render_progressively, OutputFormat};

// @module: Document loading and viewer state

/// A document ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedDocument {
    // @field: Label of the file it came from
    pub key: String,

    // @field: Resolved display title
    pub title: String,

    // @field: Aligned segments in document order
    pub segments: Vec<Segment>,
}

impl LoadedDocument {
    pub fn new(key: impl Into<String>, result: ExtractionResult) -> Self {
        Self {
            key: key.into(),
            title: result.title,
            segments: result.segments,
        }
    }

    pub fn translated_count(&self) -> usize {
        translated_count(&self.segments)
    }

    pub fn translation_coverage(&self) -> f32 {
        translation_coverage(&self.segments)
    }
}

/// Parse markup and extract it into a [`LoadedDocument`]
pub fn load_document_from_str(xml: &str, key: &str) -> Result<LoadedDocument, DocumentError> {
    let document = XmlDocument::parse(xml)?;
    let result = extract_document(&document)?;
    Ok(LoadedDocument::new(key, result))
}

/// Read, parse and extract the file at `path`
pub fn load_document<P: AsRef<Path>>(path: P, key: &str) -> Result<LoadedDocument> {
    let path = path.as_ref();
    let content = FileManager::read_to_string(path)?;
    load_document_from_str(&content, key)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to load {}", key))
}

/// Result of a load request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document is now the current one
    Loaded { key: String, segments: usize },
    /// A newer load started meanwhile; this result was dropped
    Superseded,
}

/// Handle identifying one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct ViewerState {
    index: FileIndex,
    filter: String,
    active_key: Option<String>,
    current: Option<LoadedDocument>,
}

/// Viewer state: file index, filter, and the currently displayed document.
///
/// Loads run off the async runtime. Only the most recently started load may
/// replace the current document, and a failed load leaves it untouched.
pub struct ViewerSession {
    // @field: App configuration
    config: Config,
    generation: AtomicU64,
    state: Mutex<ViewerState>,
}

impl ViewerSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
            state: Mutex::new(ViewerState::default()),
        }
    }

    /// Start a load; any earlier ticket becomes stale
    pub fn begin_load(&self) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { generation }
    }

    /// Install `document` unless a newer load has started since `ticket`
    pub async fn commit(&self, ticket: LoadTicket, document: LoadedDocument) -> LoadOutcome {
        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != ticket.generation {
            debug!("Discarding superseded load of {}", document.key);
            return LoadOutcome::Superseded;
        }

        let outcome = LoadOutcome::Loaded {
            key: document.key.clone(),
            segments: document.segments.len(),
        };
        state.active_key = Some(document.key.clone());
        state.current = Some(document);
        outcome
    }

    /// Load the file at `path` and make it the current document
    pub async fn open_file(&self, path: PathBuf, key: Option<String>) -> Result<LoadOutcome> {
        let ticket = self.begin_load();
        let key = key.unwrap_or_else(|| file_label(&path));
        info!("Reading {} ...", key);

        let task_key = key.clone();
        let loaded = tokio::task::spawn_blocking(move || load_document(&path, &task_key))
            .await
            .map_err(AppError::from)
            .context("Document loader task failed")?;

        match loaded {
            Ok(document) => {
                let outcome = self.commit(ticket, document).await;
                if let LoadOutcome::Loaded { segments, .. } = &outcome {
                    info!("Loaded {} segments.", segments);
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!("Keeping previous document, load of {} failed: {:#}", key, e);
                Err(e)
            }
        }
    }

    /// Open one file chosen directly; the index is replaced by just that file
    pub async fn open_single(&self, path: PathBuf) -> Result<LoadOutcome> {
        {
            let mut state = self.state.lock().await;
            state.index = FileIndex::single(&path);
        }
        self.open_file(path, None).await
    }

    /// Replace the index with the files found under `root`.
    ///
    /// The active file is cleared and loads still in flight are superseded; when
    /// nothing is found the displayed document is cleared too. Returns the number
    /// of indexed files.
    pub async fn index_folder(&self, root: PathBuf) -> Result<usize> {
        info!("Indexing folder {:?} ...", root);
        let index_config = self.config.index.clone();
        let index = tokio::task::spawn_blocking(move || FileIndex::build(&root, &index_config))
            .await
            .map_err(AppError::from)
            .context("Folder index task failed")??;

        let mut state = self.state.lock().await;
        // Loads started against the previous index must not commit afterwards
        self.begin_load();
        let count = index.len();
        state.index = index;
        state.active_key = None;
        if count == 0 {
            warn!("No matching files found in selected folder.");
            state.current = None;
        } else {
            info!("Indexed {} files.", count);
        }
        Ok(count)
    }

    /// Open an indexed file by key
    pub async fn open_indexed(&self, key: &str) -> Result<LoadOutcome> {
        let entry = {
            let state = self.state.lock().await;
            state.index.get(key).cloned()
        };
        let entry = entry.ok_or_else(|| anyhow!("No indexed file with key: {}", key))?;
        self.open_file(entry.path, Some(entry.key)).await
    }

    /// Open the first file of the current index, if any
    pub async fn open_first(&self) -> Result<Option<LoadOutcome>> {
        let first = {
            let state = self.state.lock().await;
            state.index.first().cloned()
        };
        match first {
            Some(entry) => Ok(Some(self.open_file(entry.path, Some(entry.key)).await?)),
            None => Ok(None),
        }
    }

    pub async fn set_filter(&self, query: &str) {
        let mut state = self.state.lock().await;
        state.filter = query.to_string();
    }

    /// Indexed files matching the current filter
    pub async fn visible_files(&self) -> Vec<IndexedFile> {
        let state = self.state.lock().await;
        state.index.filter(&state.filter).into_iter().cloned().collect()
    }

    pub async fn current(&self) -> Option<LoadedDocument> {
        self.state.lock().await.current.clone()
    }

    pub async fn active_key(&self) -> Option<String> {
        self.state.lock().await.active_key.clone()
    }

    /// Render the current document with the configured display options
    pub async fn render_current<W: Write>(&self, format: OutputFormat, writer: &mut W) -> Result<()> {
        let document = self
            .current()
            .await
            .ok_or_else(|| anyhow!("No document loaded"))?;
        let options = self.config.display.render_options();
        render_progressively(&document, &options, format, writer).await
    }
}
