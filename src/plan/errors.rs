//! Plan resolution error types
//!
//! Error codes:
//! - HC_INVALID_PLAN_REFERENCE (ERROR)
//!
//! A plan reference that points outside the range table means the planner and
//! this crate disagree about plan layout. It is never skipped silently.

use std::fmt;

/// Severity levels for plan errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Cache priming for the event is abandoned; the query still runs
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Plan-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorCode {
    /// Scan target index outside the range table, or naming a non-relation entry
    HcInvalidPlanReference,
}

impl PlanErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlanErrorCode::HcInvalidPlanReference => "HC_INVALID_PLAN_REFERENCE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for PlanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Plan error with the offending node context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanError {
    code: PlanErrorCode,
    message: String,
    /// Label of the node kind that carried the bad reference
    node: Option<&'static str>,
    /// The 1-based target index as found on the node
    target: Option<u32>,
}

impl PlanError {
    /// Target index lies outside `[1, range_table_len]`
    pub fn target_out_of_range(node: &'static str, target: u32, range_table_len: usize) -> Self {
        Self {
            code: PlanErrorCode::HcInvalidPlanReference,
            message: format!(
                "{} references range table entry {} but the range table has {} entries",
                node, target, range_table_len
            ),
            node: Some(node),
            target: Some(target),
        }
    }

    /// Target index names an entry that is not a storage relation
    pub fn not_a_relation(node: &'static str, target: u32, entry_kind: &str) -> Self {
        Self {
            code: PlanErrorCode::HcInvalidPlanReference,
            message: format!(
                "{} references range table entry {} of kind {}, not a relation",
                node, target, entry_kind
            ),
            node: Some(node),
            target: Some(target),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlanErrorCode {
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

    /// Returns the node kind label, if known
    pub fn node(&self) -> Option<&'static str> {
        self.node
    }

    /// Returns the offending target index, if known
    pub fn target(&self) -> Option<u32> {
        self.target
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlanError {}

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;
