use thiserror::Error;

/// Errors raised while building, registering, or validating metric families.
///
/// All observation methods on a live instrument are infallible on the hot path (see
/// the crate-level docs): every variant here is raised either at construction time,
/// at registration time, or while a writer pushes bytes to a caller-supplied sink.
#[derive(Debug, Error)]
pub enum Error {
    /// A metric or label name failed validation.
    #[error("invalid name `{name}`: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An argument passed to a builder or observation method was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A second family was registered under a name already present in the registry.
    #[error("a metric family named `{0}` is already registered")]
    DuplicateName(String),

    /// The exposition writer's sink rejected the bytes it was given.
    #[error("failed to write exposition output: {0}")]
    WriteError(#[from] std::fmt::Error),
}

/// Convenience alias for fallible telecore operations.
pub type Result<T> = std::result::Result<T, Error>;
