/// Convenience result type used across the card engine.
pub type CardResult<T> = Result<T, CardError>;

/// Pipeline stage that failed while composing a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositionStage {
    /// Decoding or resizing the avatar photo.
    Avatar,
    /// Laying out or drawing a text field.
    Text,
    /// Encoding or placing the barcode.
    Barcode,
}

impl std::fmt::Display for CompositionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Avatar => "avatar",
            Self::Text => "text",
            Self::Barcode => "barcode",
        })
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Template or font could not be loaded. Fatal at startup.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// The avatar pool directory had no usable entries.
    #[error("no avatars available in '{0}'")]
    NoAvatarsAvailable(String),

    /// A composition stage failed; nothing was persisted.
    #[error("composition error at {stage} stage: {message}")]
    Composition {
        /// Stage that failed.
        stage: CompositionStage,
        /// Human readable cause.
        message: String,
    },

    /// Writing an artifact to the output directory failed.
    #[error("persist error: {0}")]
    Persist(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`CardError::Composition`] value for `stage`.
    pub fn composition(stage: CompositionStage, msg: impl Into<String>) -> Self {
        Self::Composition {
            stage,
            message: msg.into(),
        }
    }

    /// Build a [`CardError::Persist`] value.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stage carried by a [`CardError::Composition`], if any.
    pub fn stage(&self) -> Option<CompositionStage> {
        match self {
            Self::Composition { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
