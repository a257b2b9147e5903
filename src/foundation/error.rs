/// Convenience result type used across the crate.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by scheduler, render-cycle and entity APIs.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Invalid caller-provided data (unknown ids, duplicate names, bad links).
    #[error("validation error: {0}")]
    Validation(String),

    /// A derived value could not be rebuilt this frame; the owner stays dirty.
    #[error("recompute error: {0}")]
    Recompute(String),

    /// A scheduled task callback failed.
    #[error("task error: {0}")]
    Task(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Recompute`] value.
    pub fn recompute(msg: impl Into<String>) -> Self {
        Self::Recompute(msg.into())
    }

    /// Build a [`SceneError::Task`] value.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Build a [`SceneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
