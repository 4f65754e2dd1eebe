//! Buffer and page store error types
//!
//! Error codes:
//! - HC_OBJECT_NOT_FOUND (ERROR) - object cannot be opened
//! - HC_HOST_IO_ERROR (ERROR) - page read, write or sync failed
//! - HC_NO_FREE_BUFFER (ERROR) - every frame is pinned

use std::fmt;
use std::io;

use crate::ids::{DatabaseId, ObjectId};

/// Severity levels for buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The operation fails; the host keeps running
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Buffer-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferErrorCode {
    /// Relation missing (dropped concurrently or never existed)
    HcObjectNotFound,
    /// Underlying storage I/O failure
    HcHostIoError,
    /// No unpinned frame available for a new page
    HcNoFreeBuffer,
}

impl BufferErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            BufferErrorCode::HcObjectNotFound => "HC_OBJECT_NOT_FOUND",
            BufferErrorCode::HcHostIoError => "HC_HOST_IO_ERROR",
            BufferErrorCode::HcNoFreeBuffer => "HC_NO_FREE_BUFFER",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for BufferErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Buffer error with context
#[derive(Debug)]
pub struct BufferError {
    code: BufferErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl BufferError {
    /// Relation cannot be opened
    pub fn object_not_found(database: DatabaseId, object: ObjectId) -> Self {
        Self {
            code: BufferErrorCode::HcObjectNotFound,
            message: format!("relation {} does not exist", object),
            details: Some(format!("database: {}, object: {}", database, object)),
            source: None,
        }
    }

    /// Storage I/O failure with the underlying cause
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: BufferErrorCode::HcHostIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Storage I/O failure without an OS-level cause
    pub fn io_error_no_source(message: impl Into<String>) -> Self {
        Self {
            code: BufferErrorCode::HcHostIoError,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// All frames pinned
    pub fn no_free_buffer(capacity: usize) -> Self {
        Self {
            code: BufferErrorCode::HcNoFreeBuffer,
            message: "no unpinned buffers available".into(),
            details: Some(format!("shared_buffers: {}", capacity)),
            source: None,
        }
    }

    /// Adds block-level context
    pub fn at_block(mut self, database: DatabaseId, object: ObjectId, block: u32) -> Self {
        self.details = Some(format!(
            "database: {}, object: {}, block: {}",
            database, object, block
        ));
        self
    }

    /// Reclassifies any failure as `HC_HOST_IO_ERROR`, keeping its context.
    ///
    /// A write-back that fails leaves durable storage behind the cache, which
    /// callers treat as an I/O failure whatever the underlying cause.
    pub fn into_host_io(self) -> Self {
        if self.is_io_error() {
            return self;
        }
        Self {
            code: BufferErrorCode::HcHostIoError,
            message: format!("write-back failed: {}", self.message),
            details: self.details,
            source: self.source,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> BufferErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_object_not_found(&self) -> bool {
        self.code == BufferErrorCode::HcObjectNotFound
    }

    pub fn is_io_error(&self) -> bool {
        self.code == BufferErrorCode::HcHostIoError
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;
