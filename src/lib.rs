/*!
 * # tei-align - side-by-side reading of annotated TEI texts
 *
 * A Rust library for pulling aligned bilingual segments out of TEI XML documents:
 * every source paragraph, verse line or heading is paired with the English
 * translation note placed right after it, if there is one.
 *
 * ## Features
 *
 * - Immutable XML document tree built with quick-xml
 * - Segment extraction with subtree exclusion (notes, page breaks, references)
 * - Strict adjacent translation note matching
 * - Language-aware title selection
 * - Folder indexing with file list filtering
 * - Text, Markdown and JSON rendering, optionally batch by batch
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `document`: Parsed, read-only XML tree
 * - `extraction`: The extraction core:
 *   - `extraction::classifier`: Element classification
 *   - `extraction::collector`: Subtree text collection
 *   - `extraction::matcher`: Translation note lookup
 *   - `extraction::segments`: Body walk producing segments
 *   - `extraction::title`: Display title selection
 * - `viewer`: Document loading and viewer session state
 * - `rendering`: Output formats and progressive rendering
 * - `file_utils`: File system operations and folder index
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod file_utils;
pub mod rendering;
pub mod viewer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Node, NodeKind, XmlDocument};
pub use errors::{AppError, DocumentError, ExtractionError};
pub use extraction::{extract_document, extract_segments, resolve_title, ExtractionResult, Segment};
pub use rendering::{OutputFormat, RenderOptions};
pub use viewer::{LoadOutcome, LoadedDocument, ViewerSession};
