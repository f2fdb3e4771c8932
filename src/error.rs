//! Error type for the archive → XML → document pipeline.
//!
//! None of these errors escape the public extraction API: the document
//! cache logs them and reports "no data". They are public so callers that
//! drive [`crate::archive`] or [`crate::tree`] directly can match on them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LattesError>;

#[derive(Debug, Error)]
pub enum LattesError {
    /// The stored blob had zero bytes.
    #[error("archive blob is empty")]
    EmptyBlob,

    /// The archive opened but contains no entries.
    #[error("archive has no entries")]
    EmptyArchive,

    /// Corrupt or foreign archive format.
    #[error("archive could not be read: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry exceeds size limit ({0} bytes)")]
    EntryTooLarge(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Well-formed tokens but not a single-rooted element tree.
    #[error("malformed document: {0}")]
    Structure(String),
}
