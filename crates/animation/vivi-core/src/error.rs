//! Error types for the session manager

/// Errors surfaced to callers of the session manager.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViviError {
    /// The host has no usable native animation primitives. Permanent for the
    /// lifetime of the manager.
    #[error("native CSS animations not supported")]
    Unsupported,

    /// Bad target or options passed to `start`.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl ViviError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// A rule the owned style container refused. Never leaves the crate's public
/// operations; `define` absorbs it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("style container rejected rule `{rule}`: {reason}")]
pub struct RuleError {
    pub rule: String,
    pub reason: String,
}

impl RuleError {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
