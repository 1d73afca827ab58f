/*!
 * Error types for the tei-align application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the segment extraction core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The extractor was handed something other than an element node
    #[error("Invalid input: expected an element node, found {0}")]
    InvalidInput(String),
}

/// Errors that can occur while turning markup into a document tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The markup is not well-formed XML
    #[error("XML parse error: {0}")]
    Parse(String),

    /// The markup contains no element at all
    #[error("No root element in XML")]
    MissingRoot,

    /// More than one top-level element
    #[error("Multiple root elements in XML: found <{0}> after the document element")]
    MultipleRoots(String),

    /// Character data outside the document element
    #[error("Text content outside the root element: {0:?}")]
    TextOutsideRoot(String),

    /// The input ended while an element was still open
    #[error("Unclosed element <{0}> at end of input")]
    UnclosedElement(String),

    /// No `body` element could be located
    #[error("No <body> found in TEI XML.")]
    MissingBody,

    /// Error from the extraction core
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document loading
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error, such as a worker task that did not complete
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Unknown(error.to_string())
    }
}
