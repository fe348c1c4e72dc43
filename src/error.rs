//! Error types surfaced by the document boundary.
//!
//! Nothing in the engine itself fails: degenerate input is clamped or falls
//! back to a safe default. These errors only report edits or imports that
//! were refused, in which case the document is left exactly as it was.

/// Reasons an edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("aoe '{aoe}' is spawned by action '{action}' and cannot be edited directly")]
    DerivedAoe { aoe: String, action: String },

    #[error("entity '{entity}' has no keyframe {index}")]
    KeyframeOutOfRange { entity: String, index: usize },
}

impl EditError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        EditError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Reasons an import was rejected as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document root must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}
